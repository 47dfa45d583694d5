use macconv_cidr::{compute, CidrError, IpVersion, HOSTS_TOO_LARGE};
use std::net::IpAddr;

fn octets(addr: IpAddr) -> Vec<u8> {
    match addr {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

#[test]
fn test_masks_are_complements_for_every_prefix() {
    for prefix in 0..=32 {
        let info = compute(&format!("172.16.5.4/{}", prefix)).expect("valid IPv4 CIDR");
        let mask = octets(info.subnet_mask());
        let inverse = octets(info.inverse_mask());
        assert_eq!(mask.len(), 4);
        assert!(
            mask.iter().zip(&inverse).all(|(m, i)| m ^ i == 0xFF),
            "/{} mask {} inverse {}",
            prefix,
            info.subnet_mask(),
            info.inverse_mask()
        );
    }

    for prefix in 0..=128 {
        let info = compute(&format!("2001:db8:1234::abcd/{}", prefix)).expect("valid IPv6 CIDR");
        let mask = octets(info.subnet_mask());
        let inverse = octets(info.inverse_mask());
        assert_eq!(mask.len(), 16);
        assert!(mask.iter().zip(&inverse).all(|(m, i)| m ^ i == 0xFF));
    }
}

#[test]
fn test_ipv4_host_count_formula() {
    for prefix in 0..=30u32 {
        let info = compute(&format!("10.1.2.3/{}", prefix)).expect("valid IPv4 CIDR");
        assert_eq!(info.total_hosts(), (1i64 << (32 - prefix)) - 2, "/{}", prefix);
    }
    assert_eq!(compute("10.1.2.3/31").unwrap().total_hosts(), 2);
    assert_eq!(compute("10.1.2.3/32").unwrap().total_hosts(), 1);
}

#[test]
fn test_network_and_broadcast_bits() {
    for prefix in 0..=32u32 {
        let info = compute(&format!("203.0.113.77/{}", prefix)).expect("valid IPv4 CIDR");
        let mask = octets(info.subnet_mask());
        let network = octets(info.network_id());
        let broadcast = octets(info.broadcast_address().expect("IPv4 has broadcast"));

        for i in 0..4 {
            assert_eq!(network[i] & !mask[i], 0, "network host bits set at /{}", prefix);
            assert_eq!(broadcast[i] | mask[i], 0xFF, "broadcast host bits clear at /{}", prefix);
            assert_eq!(broadcast[i] & mask[i], network[i]);
        }
    }
}

#[test]
fn test_ipv6_never_has_broadcast() {
    for prefix in [0, 1, 48, 64, 96, 127, 128] {
        let info = compute(&format!("fe80::1/{}", prefix)).expect("valid IPv6 CIDR");
        assert_eq!(info.version(), IpVersion::V6);
        assert!(info.broadcast_address().is_none());
    }
}

#[test]
fn test_ipv6_host_count_sentinel() {
    for prefix in 0..=65 {
        let info = compute(&format!("2001:db8::/{}", prefix)).unwrap();
        assert_eq!(info.total_hosts(), HOSTS_TOO_LARGE, "/{}", prefix);
    }
    for prefix in 66..=128u32 {
        let info = compute(&format!("2001:db8::/{}", prefix)).unwrap();
        assert_eq!(info.total_hosts(), 1i64 << (128 - prefix), "/{}", prefix);
    }
}

#[test]
fn test_malformed_inputs_never_return_partial_results() {
    let inputs = [
        "",
        "/",
        "192.168.1.0",
        "192.168.1.0/33",
        "192.168.1.0/abc",
        "192.168.1.0/24/8",
        "2001:db8::/129",
        "::g/64",
        "10.0.0.0/ 8",
    ];

    for input in inputs {
        match compute(input) {
            Err(CidrError::Parse { input: original, .. }) => assert_eq!(original, input),
            Ok(info) => panic!("{:?} unexpectedly parsed as {:?}", input, info),
        }
    }
}
