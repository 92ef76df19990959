#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::{Cursor, Read};
use transflow::cbor::cbor_to_json;
use transflow::gzip::gunzipper;
use transflow::text::to_upper;
use transflow::{Framing, VarintDelimited};

fuzz_target!(|data: &[u8]| {
    let mut sink = Vec::new();
    let _ = cbor_to_json(Cursor::new(data)).process_all(|_| Ok(()));
    let _ = gunzipper(Cursor::new(data)).read_to_end(&mut sink);
    let _ = to_upper(Cursor::new(data)).read_to_end(&mut sink);

    let mut cur = Cursor::new(data);
    let mut payload = Vec::new();
    while let Ok(Some(())) = VarintDelimited.read_and_deframe(&mut cur, &mut payload) {}
});
