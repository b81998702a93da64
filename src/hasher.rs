use md5::{Digest, Md5};

/// Number of ring points carved out of a single replica digest.
pub const POINTS_PER_REPLICA: usize = 3;

/// Returns the MD5 digest of the raw bytes of `key`.
pub fn digest(key: &str) -> [u8; 16] {
    let hash = Md5::digest(key.as_bytes());
    let mut out = [0u8; 16];
    out.copy_from_slice(&hash);
    out
}

/// Reads four digest bytes as a little-endian `u32`.
pub fn point_from_bytes(bytes: [u8; 4]) -> u32 {
    u32::from(bytes[3]) << 24 | u32::from(bytes[2]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[0])
}

/// The ring position a lookup key hashes to.
pub fn query_point(key: &str) -> u32 {
    let digest = digest(key);
    point_from_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// The points contributed by replica `replica` of `node`.
///
/// The digest of `"<node>-<replica>"` is cut into 4-byte windows starting at
/// offset 0; only the first three windows are used, the trailing four bytes
/// are ignored.
pub fn replica_points(node: &str, replica: u64) -> [u32; POINTS_PER_REPLICA] {
    let digest = digest(&format!("{node}-{replica}"));
    let mut points = [0u32; POINTS_PER_REPLICA];
    for (i, point) in points.iter_mut().enumerate() {
        let offset = i * 4;
        *point = point_from_bytes([digest[offset], digest[offset + 1], digest[offset + 2], digest[offset + 3]]);
    }
    points
}
