//! Network identifiers: MAC and IPv4 addresses, UUIDs.

use std::net::Ipv4Addr;

use anyhow::Result;
use rand::Rng;

use crate::core::value::Value;
use crate::providers::{FakeContext, Registry, check_arity};

pub fn register(registry: &mut Registry) {
    registry.register("randmac", "func_randmac", randmac);
    registry.register("randippub", "func_randippub", randippub);
    registry.register("randippriv", "func_randippriv", randippriv);
    registry.register("randuuid", "func_randuuid", randuuid);
}

fn randmac(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 0)?;
    let bytes: [u8; 6] = ctx.rng().r#gen();
    let mac = bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":");
    Ok(Value::Str(mac))
}

/// `(network, prefix length)` blocks that are never handed out as public.
const RESERVED: &[([u8; 4], u32)] = &[
    ([0, 0, 0, 0], 8),
    ([10, 0, 0, 0], 8),
    ([100, 64, 0, 0], 10),
    ([127, 0, 0, 0], 8),
    ([169, 254, 0, 0], 16),
    ([172, 16, 0, 0], 12),
    ([192, 0, 0, 0], 24),
    ([192, 0, 2, 0], 24),
    ([192, 88, 99, 0], 24),
    ([192, 168, 0, 0], 16),
    ([198, 18, 0, 0], 15),
    ([198, 51, 100, 0], 24),
    ([203, 0, 113, 0], 24),
    ([224, 0, 0, 0], 4),
    ([240, 0, 0, 0], 4),
];

const PRIVATE: &[([u8; 4], u32)] = &[
    ([10, 0, 0, 0], 8),
    ([172, 16, 0, 0], 12),
    ([192, 168, 0, 0], 16),
];

fn in_block(addr: u32, (network, prefix): ([u8; 4], u32)) -> bool {
    let mask = u32::MAX << (32 - prefix);
    addr & mask == u32::from_be_bytes(network) & mask
}

pub fn is_reserved(addr: Ipv4Addr) -> bool {
    let raw = u32::from(addr);
    RESERVED.iter().any(|block| in_block(raw, *block))
}

fn randippub(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 0)?;
    loop {
        let addr = Ipv4Addr::from(ctx.rng().r#gen::<u32>());
        if !is_reserved(addr) {
            return Ok(Value::Str(addr.to_string()));
        }
    }
}

fn randippriv(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 0)?;
    let index = ctx.rng().gen_range(0..PRIVATE.len());
    let (network, prefix) = PRIVATE[index];
    let host_bits = 32 - prefix;
    // Skip the network and broadcast addresses of each /24.
    let host = loop {
        let candidate = ctx.rng().gen_range(0..(1u32 << host_bits));
        let last_octet = candidate & 0xff;
        if last_octet != 0 && last_octet != 0xff {
            break candidate;
        }
    };
    let addr = Ipv4Addr::from(u32::from_be_bytes(network) | host);
    Ok(Value::Str(addr.to_string()))
}

fn randuuid(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 0)?;
    let bytes: [u8; 16] = ctx.rng().r#gen();
    let id = uuid::Builder::from_random_bytes(bytes).into_uuid();
    Ok(Value::Str(id.to_string()))
}
