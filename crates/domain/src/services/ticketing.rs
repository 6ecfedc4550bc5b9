//! Generation of ticket codes, team invite codes, and initial passwords.
//!
//! Codes use an unambiguous uppercase alphabet (no O/0 or I/1 confusion)
//! since participants read them aloud at event desks. Uniqueness is
//! enforced at the database; callers retry on collision.

use rand::seq::SliceRandom;
use rand::Rng;

/// Alphabet for human-facing codes.
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the random part of a ticket code.
const TICKET_CODE_LENGTH: usize = 10;

fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

/// Generates a ticket code: `TKT-` followed by ten characters.
pub fn generate_ticket_code() -> String {
    format!("TKT-{}", random_code(TICKET_CODE_LENGTH))
}

/// Generates a team invite code in `XXX-XXX-XXX` format.
pub fn generate_invite_code() -> String {
    format!(
        "{}-{}-{}",
        random_code(3),
        random_code(3),
        random_code(3)
    )
}

/// Generates an initial password for admin-created organizer accounts.
///
/// Guaranteed to satisfy the signup strength rule (length, one uppercase,
/// one lowercase, one digit) so the organizer can log in before changing it.
pub fn generate_initial_password() -> String {
    let mut rng = rand::thread_rng();

    let upper = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
    let lower = b"abcdefghijkmnopqrstuvwxyz";
    let digits = b"23456789";
    let all = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

    let mut chars: Vec<u8> = vec![
        upper[rng.gen_range(0..upper.len())],
        lower[rng.gen_range(0..lower.len())],
        digits[rng.gen_range(0..digits.len())],
    ];
    for _ in 0..9 {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(|c| c as char).collect()
}
