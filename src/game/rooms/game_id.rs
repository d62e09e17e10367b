use rand::Rng;

// No 0/o, 1/l: ids get read aloud and typed by hand
const ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";
pub const GAME_ID_LEN: usize = 6;
pub const MAX_GAME_ID_LEN: usize = 64;

fn random_code(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Draw codes until one is not `in_use`
pub fn new_game_id(in_use: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::rng();
    loop {
        let id = random_code(&mut rng, GAME_ID_LEN);
        if !in_use(&id) {
            return id;
        }
    }
}

/// Client-chosen ids are accepted as long as they are short and URL-safe
pub fn is_valid_game_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_GAME_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn generated_ids_use_the_readable_alphabet() {
        for _ in 0..100 {
            let id = new_game_id(|_| false);
            assert_eq!(id.len(), GAME_ID_LEN);
            assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
            assert!(is_valid_game_id(&id));
        }
    }

    #[test]
    fn skips_ids_already_in_use() {
        let calls = Cell::new(0);
        let id = new_game_id(|_| {
            calls.set(calls.get() + 1);
            calls.get() < 3
        });
        assert_eq!(calls.get(), 3);
        assert_eq!(id.len(), GAME_ID_LEN);
    }

    #[test]
    fn validates_client_supplied_ids() {
        assert!(is_valid_game_id("ab12"));
        assert!(is_valid_game_id("room_7-b"));
        assert!(!is_valid_game_id(""));
        assert!(!is_valid_game_id("has space"));
        assert!(!is_valid_game_id(&"a".repeat(MAX_GAME_ID_LEN + 1)));
    }
}
