use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

mod groups;
mod wire;

pub(crate) fn test_rng() -> XorShiftRng {
    let seed = [
        0x5d, 0xbe, 0x62, 0x59, 0x8d, 0x31, 0x3d, 0x76, 0x32, 0x37, 0xdb, 0x17, 0xe5, 0xbc,
        0x06, 0x54,
    ];
    XorShiftRng::from_seed(seed)
}
