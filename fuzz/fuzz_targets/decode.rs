#![no_main]

use libfuzzer_sys::fuzz_target;
use berdec::OctetString;
use berdec::datetime::{DateOrDateTz, DatetimeOrDatetimeTz, TimeTz};
use berdec::decode::{decode_slice, DecoderOptions};

macro_rules! decode_as {
    ( $data:expr, $options:expr, $type:ty ) => {{
        let mut value = <$type>::default();
        let _ = decode_slice($data, $options, &mut value);
    }}
}

fuzz_target!(|data: &[u8]| {
    let options = DecoderOptions::default().with_max_depth(8);
    decode_as!(data, &options, i64);
    decode_as!(data, &options, u32);
    decode_as!(data, &options, f64);
    decode_as!(data, &options, bool);
    decode_as!(data, &options, String);
    decode_as!(data, &options, OctetString);
    decode_as!(data, &options, Option<i32>);
    decode_as!(data, &options, Vec<Option<String>>);
    decode_as!(data, &options, Vec<Vec<OctetString>>);
    decode_as!(data, &options, DateOrDateTz);
    decode_as!(data, &options, TimeTz);
    decode_as!(data, &options, Vec<DatetimeOrDatetimeTz>);

    let options = options.with_skip_unknown_elements(false);
    decode_as!(data, &options, Vec<Vec<i8>>);
});
