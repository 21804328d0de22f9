use rand::Rng;

const ROOM_ID_PREFIX: &str = "room-";
// 12 hex chars carry 48 bits of randomness, enough that collisions across
// the lifetime of a deployment are negligible.
const ROOM_ID_RANDOM_CHARS: usize = 12;
const ACCESS_CODE_LENGTH: usize = 6;
const PASSWORD_BYTES: usize = 6;

const HEX_LOWER: &[u8] = b"0123456789abcdef";
const ACCESS_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random room id of the form `room-1f3a9c04be72`.
pub fn generate_room_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ROOM_ID_RANDOM_CHARS)
        .map(|_| HEX_LOWER[rng.gen_range(0..HEX_LOWER.len())] as char)
        .collect();
    format!("{}{}", ROOM_ID_PREFIX, suffix)
}

/// Six-character uppercase alphanumeric code read out to invitees.
pub fn generate_access_code() -> String {
    let mut rng = rand::thread_rng();
    (0..ACCESS_CODE_LENGTH)
        .map(|_| ACCESS_CODE_CHARSET[rng.gen_range(0..ACCESS_CODE_CHARSET.len())] as char)
        .collect()
}

/// Twelve uppercase hex characters from six random bytes.
pub fn generate_room_password() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; PASSWORD_BYTES] = rng.gen();
    bytes.iter().map(|byte| format!("{:02X}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn room_id_has_prefix_and_hex_suffix() {
        let room_id = generate_room_id();
        assert!(room_id.starts_with("room-"));

        let suffix = &room_id["room-".len()..];
        assert_eq!(suffix.len(), 12);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn access_code_is_six_uppercase_alphanumerics() {
        let code = generate_access_code();
        assert_eq!(code.len(), 6);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn password_is_twelve_uppercase_hex_chars() {
        let password = generate_room_password();
        assert_eq!(password.len(), 12);
        assert!(password
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn generated_room_ids_do_not_collide_in_practice() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_room_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
