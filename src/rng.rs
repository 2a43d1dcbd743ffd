// Uniform samples in [0, 1) for piece placement (not crypto relevant).

#[cfg(feature = "rng")]
pub fn unit_sample() -> f64 {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_err() {
        return js_sys::Math::random();
    }
    // 53 random mantissa bits -> [0, 1)
    (u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(not(feature = "rng"))]
pub fn unit_sample() -> f64 {
    js_sys::Math::random()
}
