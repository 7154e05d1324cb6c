/// Computes the XOR "checksum" of the given data
pub fn xor_sum(data: &[u8]) -> u8 {
    data.iter().fold(0xff, |acc, x| acc ^ x)
}

#[test]
fn test_xor_sum() {
    // LEN, TYPE and command ID of a GetSerialApiInitData request
    let input = hex::decode("030002").unwrap();
    assert_eq!(xor_sum(&input), 0xfe);

    assert_eq!(xor_sum(&[]), 0xff);
    assert_eq!(xor_sum(&[0xff]), 0x00);
}
