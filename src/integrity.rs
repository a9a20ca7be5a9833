use std::fs;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

const READ_BUFFER: usize = 8 * 1024;

/// Lowercase hex SHA-256 of a file, read in fixed-size increments.
pub fn digest(path: &Path) -> io::Result<String> {
    digest_parts(&[path])
}

/// Digest of several files read back to back, i.e. of the reassembled archive.
pub fn digest_parts<P: AsRef<Path>>(parts: &[P]) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; READ_BUFFER];
    for part in parts {
        let mut file = fs::File::open(part.as_ref())?;
        loop {
            let read = file.read(&mut buf)?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether `value` looks like a SHA-256 hex digest that can be verified against.
pub fn is_sha256_hex(value: &str) -> bool {
    let value = value.trim();
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Sequence number of a split-archive part, taken from its trailing `.<n>` component.
pub fn chunk_sequence(name: &str) -> Option<u32> {
    let (_, suffix) = name.rsplit_once('.')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Sort part names by their numeric sequence, never lexically.
///
/// Fails with the offending name when more than one part is given and one of
/// them carries no sequence suffix. A single unsuffixed name is a plain archive.
pub fn order_chunks<S: AsRef<str>>(names: &mut [S]) -> Result<(), String> {
    if names.len() <= 1 {
        return Ok(());
    }
    if let Some(bad) = names
        .iter()
        .find(|name| chunk_sequence(name.as_ref()).is_none())
    {
        let bad: &str = bad.as_ref();
        return Err(bad.to_owned());
    }
    names.sort_by_key(|name| chunk_sequence(name.as_ref()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_byte_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pack.7z.001");
        fs::write(&path, b"rebirth mod pack payload").unwrap();

        let first = digest(&path).unwrap();
        let second = digest(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        fs::write(&path, b"rebirth mod pack paylaod").unwrap();
        assert_ne!(digest(&path).unwrap(), first);
    }

    #[test]
    fn digest_of_empty_file_is_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, b"").unwrap();
        assert_eq!(
            digest(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_parts_matches_concatenated_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("pack.7z.001");
        let b = dir.path().join("pack.7z.002");
        let whole = dir.path().join("pack.7z");
        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&a, &payload[..12_345]).unwrap();
        fs::write(&b, &payload[12_345..]).unwrap();
        fs::write(&whole, &payload).unwrap();

        assert_eq!(digest_parts(&[&a, &b]).unwrap(), digest(&whole).unwrap());
        assert_ne!(digest_parts(&[&b, &a]).unwrap(), digest(&whole).unwrap());
    }

    #[test]
    fn digest_of_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = digest(&dir.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn recognises_sha256_digests() {
        assert!(is_sha256_hex(
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        ));
        assert!(!is_sha256_hex("abc123"));
        assert!(!is_sha256_hex(""));
    }

    #[test]
    fn parses_trailing_sequence() {
        assert_eq!(chunk_sequence("pack.7z.001"), Some(1));
        assert_eq!(chunk_sequence("Rebirth.split.11"), Some(11));
        assert_eq!(chunk_sequence("pack.7z"), None);
        assert_eq!(chunk_sequence("pack."), None);
        assert_eq!(chunk_sequence("noext"), None);
    }

    #[test]
    fn orders_numerically_not_lexically() {
        let mut names: Vec<String> = [1, 10, 11, 2, 3, 4, 5, 6, 7, 8, 9]
            .iter()
            .map(|n| format!("name.split.{n}"))
            .collect();
        order_chunks(&mut names).unwrap();
        let sequence: Vec<u32> = names.iter().filter_map(|n| chunk_sequence(n)).collect();
        assert_eq!(sequence, (1..=11).collect::<Vec<_>>());
    }

    #[test]
    fn rejects_unsuffixed_part_in_a_set() {
        let mut names = vec!["pack.7z.002", "readme.txt"];
        assert_eq!(order_chunks(&mut names), Err("readme.txt".to_owned()));

        let mut single = vec!["pack.7z"];
        assert!(order_chunks(&mut single).is_ok());
    }
}
