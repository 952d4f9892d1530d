//! Tests decoding complete values.
#![cfg(test)]

use std::io;
use hex_literal::hex;
use crate::datetime::{
    Date, DateOrDateTz, DateTz, Datetime, DatetimeOrDatetimeTz, DatetimeTz,
};
use crate::fixture::{dcons, icons, prim};
use crate::ident::Tag;
use crate::ostring::OctetString;
use crate::value::{
    Choice, Decodable, Enumeration, FieldInfo, FormattingMode, Sequence,
    ValueMut,
};
use super::node::Node;
use super::*;


//------------ Test Types ----------------------------------------------------

macro_rules! sequence {
    ( $name:ident, $fields:expr, { $( $idx:expr => $field:ident ),* } ) => {
        impl Sequence for $name {
            fn fields(&self) -> &[FieldInfo] {
                $fields
            }

            fn field_mut(
                &mut self, index: usize
            ) -> Option<&mut dyn Decodable> {
                match index {
                    $( $idx => Some(&mut self.$field), )*
                    _ => None,
                }
            }

            fn reset(&mut self) {
                *self = Self::default()
            }
        }

        impl Decodable for $name {
            fn value_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Sequence(self)
            }
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct MySequence {
    i: i32,
    s: String,
}

const MY_SEQUENCE_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("i", 0),
    FieldInfo::new("s", 1),
];

sequence!(MySequence, MY_SEQUENCE_FIELDS, { 0 => i, 1 => s });


#[derive(Debug, Default, PartialEq)]
enum MyChoice {
    #[default]
    Unselected,
    Seq(MySequence),
    Num(i32),
}

const MY_CHOICE_SELECTIONS: &[FieldInfo] = &[
    FieldInfo::new("seq", 0),
    FieldInfo::new("num", 1),
];

impl Choice for MyChoice {
    fn selections(&self) -> &[FieldInfo] {
        MY_CHOICE_SELECTIONS
    }

    fn select(&mut self, index: usize) -> Option<&mut dyn Decodable> {
        *self = match index {
            0 => MyChoice::Seq(MySequence::default()),
            1 => MyChoice::Num(0),
            _ => return None,
        };
        match self {
            MyChoice::Seq(value) => Some(value),
            MyChoice::Num(value) => Some(value),
            MyChoice::Unselected => None,
        }
    }

    fn reset(&mut self) {
        *self = MyChoice::Unselected
    }
}

impl Decodable for MyChoice {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Choice(self)
    }
}


#[derive(Debug, Default, PartialEq)]
struct WithNullable {
    a: Option<i32>,
    b: Option<String>,
}

const WITH_NULLABLE_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("a", 0),
    FieldInfo::new("b", 1),
];

sequence!(WithNullable, WITH_NULLABLE_FIELDS, { 0 => a, 1 => b });


#[derive(Debug, Default, PartialEq)]
struct WithNillable {
    i: i32,
    n: Option<String>,
    s: String,
}

const WITH_NILLABLE_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("i", 0),
    FieldInfo::new("n", 1).with_hint(FormattingMode::Nillable),
    FieldInfo::new("s", 2),
];

sequence!(WithNillable, WITH_NILLABLE_FIELDS, { 0 => i, 1 => n, 2 => s });


#[derive(Debug, Default, PartialEq)]
struct WithArray {
    i: i32,
    list: Vec<String>,
}

const WITH_ARRAY_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("i", 0),
    FieldInfo::new("list", 1).with_hint(FormattingMode::List),
];

sequence!(WithArray, WITH_ARRAY_FIELDS, { 0 => i, 1 => list });


#[derive(Debug, Default, PartialEq)]
enum Inner {
    #[default]
    Unselected,
    Num(i32),
    Text(String),
}

const INNER_SELECTIONS: &[FieldInfo] = &[
    FieldInfo::new("num", 0),
    FieldInfo::new("text", 1),
];

impl Choice for Inner {
    fn selections(&self) -> &[FieldInfo] {
        INNER_SELECTIONS
    }

    fn select(&mut self, index: usize) -> Option<&mut dyn Decodable> {
        *self = match index {
            0 => Inner::Num(0),
            1 => Inner::Text(String::new()),
            _ => return None,
        };
        match self {
            Inner::Num(value) => Some(value),
            Inner::Text(value) => Some(value),
            Inner::Unselected => None,
        }
    }

    fn reset(&mut self) {
        *self = Inner::Unselected
    }
}

impl Decodable for Inner {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Choice(self)
    }
}


#[derive(Debug, Default, PartialEq)]
enum Anonymous {
    #[default]
    Unselected,
    Inner(Inner),
    Flag(bool),
}

const ANONYMOUS_SELECTIONS: &[FieldInfo] = &[
    FieldInfo::new("inner", 1),
    FieldInfo::new("flag", 3),
];

impl Choice for Anonymous {
    fn selections(&self) -> &[FieldInfo] {
        ANONYMOUS_SELECTIONS
    }

    fn select(&mut self, index: usize) -> Option<&mut dyn Decodable> {
        *self = match index {
            0 => Anonymous::Inner(Inner::default()),
            1 => Anonymous::Flag(false),
            _ => return None,
        };
        match self {
            Anonymous::Inner(value) => Some(value),
            Anonymous::Flag(value) => Some(value),
            Anonymous::Unselected => None,
        }
    }

    fn reset(&mut self) {
        *self = Anonymous::Unselected
    }
}

impl Decodable for Anonymous {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Choice(self)
    }
}


#[derive(Debug, Default, PartialEq)]
struct WithAnonymous {
    i: i32,
    c: Anonymous,
    s: String,
}

// The untagged field shares its id with a selection and must not be
// matched by it.
const WITH_ANONYMOUS_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("i", 0),
    FieldInfo::new("c", 1).with_hint(FormattingMode::Untagged),
    FieldInfo::new("s", 2),
];

sequence!(WithAnonymous, WITH_ANONYMOUS_FIELDS, { 0 => i, 1 => c, 2 => s });


#[derive(Debug, Default, PartialEq)]
struct WithDefault {
    i: i32,
    s: String,
}

const WITH_DEFAULT_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("i", 0),
    FieldInfo::new("s", 1).with_default(),
];

impl Sequence for WithDefault {
    fn fields(&self) -> &[FieldInfo] {
        WITH_DEFAULT_FIELDS
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Decodable> {
        match index {
            0 => Some(&mut self.i),
            1 => Some(&mut self.s),
            _ => None,
        }
    }

    fn reset(&mut self) {
        *self = Self::default()
    }

    fn apply_default(&mut self, index: usize) {
        if index == 1 {
            self.s = String::from("none")
        }
    }
}

impl Decodable for WithDefault {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }
}


/// A sequence of seven integer fields with large tag numbers.
#[derive(Debug, Default, PartialEq)]
struct HighTags([i32; 7]);

const HIGH_TAG_NUMBERS: [u32; 7] = [0, 30, 31, 127, 128, 16383, 16384];

const HIGH_TAG_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("t0", 0),
    FieldInfo::new("t30", 30),
    FieldInfo::new("t31", 31),
    FieldInfo::new("t127", 127),
    FieldInfo::new("t128", 128),
    FieldInfo::new("t16383", 16383),
    FieldInfo::new("t16384", 16384),
];

impl Sequence for HighTags {
    fn fields(&self) -> &[FieldInfo] {
        HIGH_TAG_FIELDS
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Decodable> {
        self.0.get_mut(index).map(|value| value as &mut dyn Decodable)
    }

    fn reset(&mut self) {
        *self = Self::default()
    }
}

impl Decodable for HighTags {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }
}


#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Color {
    #[default]
    Red,
    Green,
}

impl Enumeration for Color {
    fn set_from_int(&mut self, value: i32) -> bool {
        *self = match value {
            0 => Color::Red,
            1 => Color::Green,
            _ => return false,
        };
        true
    }
}

impl Decodable for Color {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Enumeration(self)
    }
}


#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Level {
    #[default]
    Low,
    Other(i32),
}

impl Enumeration for Level {
    fn set_from_int(&mut self, value: i32) -> bool {
        *self = match value {
            0 => Level::Low,
            value => Level::Other(value),
        };
        true
    }
}

impl Decodable for Level {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Enumeration(self)
    }
}


//------------ Helpers -------------------------------------------------------

fn decode<T: Decodable + ?Sized>(
    data: &[u8], target: &mut T
) -> Result<Outcome, DecodeError> {
    decode_slice(data, &DecoderOptions::default(), target)
}

fn decode_with<'a, T: Decodable + ?Sized>(
    data: &'a [u8], options: DecoderOptions, target: &mut T
) -> (Result<Outcome, DecodeError>, Decoder<SliceSource<'a>>) {
    let mut decoder = Decoder::from_slice(data, options);
    let res = decoder.decode(target);
    (res, decoder)
}

fn no_skip() -> DecoderOptions {
    DecoderOptions::default().with_skip_unknown_elements(false)
}

fn hello_sequence() -> MySequence {
    MySequence { i: 0x22, s: "Hello".into() }
}


//------------ Sequences -----------------------------------------------------

#[test]
fn decode_sequence() {
    let mut value = MySequence::default();
    assert_eq!(
        decode(&hex!("300A 800122 810548656C6C6F"), &mut value).unwrap(),
        Outcome::Success
    );
    assert_eq!(value, hello_sequence());

    let mut value = MySequence::default();
    assert_eq!(
        decode(
            &hex!("3080 800122 810548656C6C6F 0000"), &mut value
        ).unwrap(),
        Outcome::Success
    );
    assert_eq!(value, hello_sequence());
}

#[test]
fn sequence_resets_absent_fields() {
    let mut value = hello_sequence();
    decode(&hex!("3003 800107"), &mut value).unwrap();
    assert_eq!(value, MySequence { i: 7, s: String::new() });
}

#[test]
fn skip_unknown_fields() {
    for data in [
        &hex!("300D 820199 800122 810548656C6C6F")[..],
        &hex!("300F A203820199 800122 810548656C6C6F")[..],
        &hex!("3011 A2808201990000 800122 810548656C6C6F")[..],
        &hex!("3080 A2808201990000 800122 810548656C6C6F 0000")[..],
    ] {
        let mut value = MySequence::default();
        let (res, decoder) = decode_with(
            data, DecoderOptions::default(), &mut value
        );
        assert_eq!(res.unwrap(), Outcome::Warning);
        assert_eq!(value, hello_sequence());
        assert_eq!(decoder.num_unknown_elements_skipped(), 1);
        assert_eq!(decoder.severity(), Severity::Warning);
        assert!(decoder.log().contains("skipping unknown element [2]"));
        assert_eq!(decoder.pos().to_usize(), data.len());
    }
}

#[test]
fn refuse_unknown_fields() {
    let data = hex!("300D 820199 800122 810548656C6C6F");
    let mut value = MySequence::default();
    let (res, decoder) = decode_with(&data, no_skip(), &mut value);
    assert_eq!(res.unwrap_err().kind(), ErrorKind::UnexpectedElement);
    assert_eq!(decoder.num_unknown_elements_skipped(), 1);
    assert_eq!(decoder.severity(), Severity::Error);
    let log = decoder.log();
    assert!(log.starts_with("ERROR: unexpected element"));
    assert!(log.contains("unknown element [2]"));
    assert!(log.contains(
        "    depth 1: octets [0, 15) CONSTRUCTED SEQUENCE length 13\n"
    ));
    assert!(log.contains(
        "    depth 2: octets [2, 5) PRIMITIVE [2] length 1\n"
    ));
}

#[test]
fn unknown_counter_accumulates() {
    let data = hex!("300D 820199 800122 810548656C6C6F");
    let mut decoder = Decoder::from_slice(
        &data, DecoderOptions::default()
    );
    let mut value = MySequence::default();
    decoder.decode(&mut value).unwrap();
    let mut decoder = Decoder::from_slice(
        decoder.into_source().remaining(), DecoderOptions::default()
    );
    decoder.set_num_unknown_elements_skipped(5);
    assert!(decoder.decode(&mut value).is_err());
    assert_eq!(decoder.num_unknown_elements_skipped(), 5);

    let data = [&data[..], &data[..]].concat();
    let mut decoder = Decoder::from_slice(&data, DecoderOptions::default());
    decoder.decode(&mut value).unwrap();
    decoder.decode(&mut value).unwrap();
    assert_eq!(decoder.num_unknown_elements_skipped(), 2);
    decoder.set_num_unknown_elements_skipped(0);
    assert_eq!(decoder.num_unknown_elements_skipped(), 0);
}

#[test]
fn high_tag_numbers() {
    let fields: Vec<_> = HIGH_TAG_NUMBERS.iter().enumerate().map(
        |(index, number)| prim(Tag::ctx(*number), [index as u8 + 1])
    ).collect();
    let data = dcons(Tag::SEQUENCE, &fields);
    let mut value = HighTags::default();
    assert_eq!(decode(&data, &mut value).unwrap(), Outcome::Success);
    assert_eq!(value, HighTags([1, 2, 3, 4, 5, 6, 7]));
}

#[test]
fn default_empty_strings() {
    let data = hex!("3005 800122 8100");
    let mut value = WithDefault::default();
    decode(&data, &mut value).unwrap();
    assert_eq!(value.s, "none");

    let mut value = WithDefault::default();
    let (res, _) = decode_with(
        &data,
        DecoderOptions::default().with_default_empty_strings(false),
        &mut value
    );
    res.unwrap();
    assert_eq!(value.s, "");

    let mut value = WithDefault::default();
    decode(&hex!("3006 800122 810141"), &mut value).unwrap();
    assert_eq!(value.s, "A");
}


//------------ Choices -------------------------------------------------------

#[test]
fn decode_choice() {
    let mut value = MyChoice::default();
    decode(&hex!("3005 A003800122"), &mut value).unwrap();
    assert_eq!(
        value, MyChoice::Seq(MySequence { i: 0x22, s: String::new() })
    );

    let mut value = MyChoice::default();
    decode(&hex!("3080 A080800122 0000 0000"), &mut value).unwrap();
    assert_eq!(
        value, MyChoice::Seq(MySequence { i: 0x22, s: String::new() })
    );

    let mut value = MyChoice::Num(12);
    decode(&hex!("3000"), &mut value).unwrap();
    assert_eq!(value, MyChoice::Unselected);
}

#[test]
fn choice_with_unknown_selection() {
    let mut value = MyChoice::default();
    let (res, decoder) = decode_with(
        &hex!("3006 820105 810107"), DecoderOptions::default(), &mut value
    );
    assert_eq!(res.unwrap(), Outcome::Warning);
    assert_eq!(value, MyChoice::Num(7));
    assert_eq!(decoder.num_unknown_elements_skipped(), 1);
}

#[test]
fn choice_with_two_selections() {
    let mut value = MyChoice::default();
    assert_eq!(
        decode(&hex!("3006 810105 810106"), &mut value).unwrap_err().kind(),
        ErrorKind::UnexpectedElement
    );
}

#[test]
fn sequence_and_choice_confused() {
    let mut value = MyChoice::default();
    let (res, decoder) = decode_with(
        &hex!("300A 800122 810548656C6C6F"),
        DecoderOptions::default(), &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::UnexpectedElement);
    assert!(!decoder.log().is_empty());

    let mut value = MySequence::default();
    let (res, decoder) = decode_with(
        &hex!("3005 A003800122"), DecoderOptions::default(), &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::UnexpectedElement);
    assert!(decoder.log().contains("field 'i'"));
}

#[test]
fn untagged_choice() {
    let mut value = WithAnonymous::default();
    decode(
        &hex!("300F 800122 A103800141 820548656C6C6F"), &mut value
    ).unwrap();
    assert_eq!(
        value,
        WithAnonymous {
            i: 0x22,
            c: Anonymous::Inner(Inner::Num(0x41)),
            s: "Hello".into(),
        }
    );

    let mut value = WithAnonymous::default();
    decode(
        &hex!("3014 800122 A1088106576F726C6421 820548656C6C6F"),
        &mut value
    ).unwrap();
    assert_eq!(
        value,
        WithAnonymous {
            i: 0x22,
            c: Anonymous::Inner(Inner::Text("World!".into())),
            s: "Hello".into(),
        }
    );

    let mut value = WithAnonymous::default();
    decode(&hex!("3006 800122 8301FF"), &mut value).unwrap();
    assert_eq!(value.c, Anonymous::Flag(true));
}


//------------ Nullable and Nillable -----------------------------------------

#[test]
fn nullable_fields() {
    let mut value = WithNullable { a: None, b: Some("x".into()) };
    decode(&hex!("3003 800122"), &mut value).unwrap();
    assert_eq!(value, WithNullable { a: Some(0x22), b: None });

    let mut value = WithNullable::default();
    decode(&hex!("3006 800122 810141"), &mut value).unwrap();
    assert_eq!(value, WithNullable { a: Some(0x22), b: Some("A".into()) });
}

#[test]
fn nillable_fields() {
    let mut value = WithNillable::default();
    decode(&hex!("300C 800122 A100 820548656C6C6F"), &mut value).unwrap();
    assert_eq!(
        value, WithNillable { i: 0x22, n: None, s: "Hello".into() }
    );

    let mut value = WithNillable::default();
    decode(
        &hex!("3014 800122 A1088006576F726C6421 820548656C6C6F"),
        &mut value
    ).unwrap();
    assert_eq!(
        value,
        WithNillable {
            i: 0x22, n: Some("World!".into()), s: "Hello".into()
        }
    );

    let mut value = WithNillable::default();
    decode(
        &hex!("3080 800122 A1808006576F726C64210000 0000"), &mut value
    ).unwrap();
    assert_eq!(value.n.as_deref(), Some("World!"));
}

#[test]
fn top_level_null() {
    let mut value = Some(3i32);
    decode(&hex!("0500"), &mut value).unwrap();
    assert_eq!(value, None);

    decode(&hex!("020105"), &mut value).unwrap();
    assert_eq!(value, Some(5));

    assert_eq!(
        decode(&hex!("050100"), &mut value).unwrap_err().kind(),
        ErrorKind::InvalidContent
    );
}


//------------ Arrays --------------------------------------------------------

#[test]
fn array_fields() {
    let mut value = WithArray { i: 0, list: vec!["x".into()] };
    decode(&hex!("3005 800122 A100"), &mut value).unwrap();
    assert_eq!(value, WithArray { i: 0x22, list: Vec::new() });

    let expected = WithArray {
        i: 0x22, list: vec!["Hello".into(), "World!".into()]
    };
    let mut value = WithArray::default();
    decode(
        &hex!("3014 800122 A10F 0C0548656C6C6F 0C06576F726C6421"),
        &mut value
    ).unwrap();
    assert_eq!(value, expected);

    let mut value = WithArray::default();
    decode(
        &hex!("3080 800122 A180 0C0548656C6C6F 0C06576F726C6421 0000 0000"),
        &mut value
    ).unwrap();
    assert_eq!(value, expected);
}

#[test]
fn array_elements() {
    let mut value: Vec<Option<i32>> = Vec::new();
    decode(&hex!("3005 020101 0500"), &mut value).unwrap();
    assert_eq!(value, [Some(1), None]);

    let mut value: Vec<i32> = Vec::new();
    let (res, decoder) = decode_with(
        &hex!("3006 020101 0401FF"), DecoderOptions::default(), &mut value
    );
    assert_eq!(res.unwrap(), Outcome::Warning);
    assert_eq!(value, [1]);
    assert_eq!(decoder.num_unknown_elements_skipped(), 1);

    let mut value: Vec<i32> = Vec::new();
    let (res, _) = decode_with(
        &hex!("3006 020101 020102"),
        DecoderOptions::default().with_max_sequence_size(1),
        &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::SizeLimitExceeded);
}


//------------ Scalars and Enumerations --------------------------------------

#[test]
fn scalars() {
    let mut string = String::new();
    decode(&hex!("0C0548656C6C6F"), &mut string).unwrap();
    assert_eq!(string, "Hello");

    let mut flag = false;
    decode(&hex!("0101FF"), &mut flag).unwrap();
    assert!(flag);

    let mut real = 0f64;
    decode(&hex!("0903C0FF03"), &mut real).unwrap();
    assert_eq!(real, -1.5);

    let mut octets = OctetString::default();
    decode(&hex!("0403010203"), &mut octets).unwrap();
    assert_eq!(octets, [1, 2, 3]);

    let mut small = 0u8;
    assert_eq!(
        decode(&hex!("02020100"), &mut small).unwrap_err().kind(),
        ErrorKind::InvalidContent
    );

    let mut number = 0i32;
    assert_eq!(
        decode(&hex!("040100"), &mut number).unwrap_err().kind(),
        ErrorKind::UnexpectedElement
    );
    assert_eq!(
        decode(&hex!("2203020100"), &mut number).unwrap_err().kind(),
        ErrorKind::UnexpectedElement
    );
}

#[test]
fn enumerations() {
    let mut value = Color::Green;
    decode(&hex!("0A0100"), &mut value).unwrap();
    assert_eq!(value, Color::Red);
    decode(&hex!("0A0101"), &mut value).unwrap();
    assert_eq!(value, Color::Green);
    assert_eq!(
        decode(&hex!("0A0102"), &mut value).unwrap_err().kind(),
        ErrorKind::InvalidContent
    );
    assert_eq!(value, Color::Green);

    let mut value = Level::default();
    decode(&hex!("0A0102"), &mut value).unwrap();
    assert_eq!(value, Level::Other(2));

    assert_eq!(
        decode(&hex!("020100"), &mut value).unwrap_err().kind(),
        ErrorKind::UnexpectedElement
    );
}

#[test]
fn lengths() {
    for len in [0, 1, 127, 128, 255, 256, 65535, 65536] {
        let data = prim(Tag::OCTET_STRING, vec![0xAB; len]);
        let mut value = OctetString::default();
        let (res, decoder) = decode_with(
            &data, DecoderOptions::default(), &mut value
        );
        res.unwrap();
        assert_eq!(value.len(), len);
        assert_eq!(decoder.pos().to_usize(), data.len());
    }
}


//------------ Framing -------------------------------------------------------

#[test]
fn indefinite_lengths() {
    let data = icons(Tag::SEQUENCE, &[
        prim(Tag::ctx(0), [0x22]),
        prim(Tag::ctx(1), "Hello"),
    ]);
    let mut value = MySequence::default();
    let (res, decoder) = decode_with(
        &data, DecoderOptions::default(), &mut value
    );
    res.unwrap();
    assert_eq!(value, hello_sequence());
    assert_eq!(decoder.pos().to_usize(), data.len());

    let mut value = OctetString::default();
    assert_eq!(
        decode(&hex!("0480 0102 0000"), &mut value).unwrap_err().kind(),
        ErrorKind::UnsupportedIndefiniteLength
    );
}

#[test]
fn truncated_data() {
    let mut value = MySequence::default();
    assert_eq!(
        decode(
            &hex!("300A 800122 810548656C6C"), &mut value
        ).unwrap_err().kind(),
        ErrorKind::StreamError
    );
    assert_eq!(
        decode(
            &hex!("3080 800122 810548656C6C6F 00"), &mut value
        ).unwrap_err().kind(),
        ErrorKind::StreamError
    );
}

#[test]
fn length_mismatch() {
    let mut value = MySequence::default();
    assert_eq!(
        decode(
            &hex!("3009 800122 810548656C6C6F"), &mut value
        ).unwrap_err().kind(),
        ErrorKind::LengthMismatch
    );
    assert_eq!(
        decode(&hex!("3002 0000"), &mut value).unwrap_err().kind(),
        ErrorKind::UnexpectedElement
    );
    assert_eq!(
        decode(&hex!("020105 00"), &mut 0i32).unwrap_err().kind(),
        ErrorKind::LengthMismatch
    );
}

#[test]
fn depth_limit() {
    let data = hex!("3005 3003 020107");
    let mut value: Vec<Vec<i32>> = Vec::new();
    let (res, _) = decode_with(
        &data, DecoderOptions::default().with_max_depth(3), &mut value
    );
    res.unwrap();
    assert_eq!(value, [[7]]);

    let (res, decoder) = decode_with(
        &data, DecoderOptions::default().with_max_depth(2), &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::DepthExceeded);
    assert!(decoder.log().contains("depth 3:"));
}

#[test]
fn nested_length_exceeds_parent() {
    // The field claims five octets but the sequence only has three left.
    // Nothing of the field’s content may be read.
    let data = hex!("3003 8105 48656C6C6F 020105").to_vec();
    let mut decoder = Decoder::from_reader(
        io::Cursor::new(data), DecoderOptions::default()
    );
    let mut value = MySequence::default();
    assert_eq!(
        decoder.decode(&mut value).unwrap_err().kind(),
        ErrorKind::LengthMismatch
    );
    assert_eq!(decoder.pos().to_usize(), 4);
    assert!(decoder.log().contains("exceeds the 3 octets left"));
    assert!(decoder.log().contains("depth 2: octets [2, 9)"));

    // Unknown elements aren’t skipped past the end either.
    let data = hex!("3005 820499 800122");
    let mut value = MySequence::default();
    let (res, decoder) = decode_with(
        &data, DecoderOptions::default(), &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::LengthMismatch);
    assert_eq!(decoder.pos().to_usize(), 4);
    assert_eq!(decoder.num_unknown_elements_skipped(), 0);

    // A field that ends exactly with the sequence is fine.
    let mut value = MySequence::default();
    decode(&hex!("3007 810548656C6C6F"), &mut value).unwrap();
    assert_eq!(value.s, "Hello");
}

#[test]
fn huge_lengths() {
    let long = hex!("88FFFFFFFFFFFFFFFF");

    let mut data = vec![0x04];
    data.extend_from_slice(&long);
    let mut value = OctetString::default();
    let (res, decoder) = decode_with(
        &data, DecoderOptions::default(), &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::SizeLimitExceeded);
    assert!(decoder.log().contains("depth 1: octets [0, ?)"));

    let mut data = hex!("3080 82").to_vec();
    data.extend_from_slice(&long);
    data.extend_from_slice(&hex!("0000"));
    let mut value = MySequence::default();
    let (res, decoder) = decode_with(
        &data, DecoderOptions::default().with_trace_level(1), &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::StreamError);
    assert!(decoder.log().contains("skipping unknown element [2]"));
    assert!(decoder.log().contains("depth 2: octets [2, ?)"));

    let mut data = hex!("300A 82").to_vec();
    data.extend_from_slice(&long);
    let mut value = MySequence::default();
    assert_eq!(
        decode(&data, &mut value).unwrap_err().kind(),
        ErrorKind::LengthMismatch
    );
}

#[test]
fn malformed_end_of_contents() {
    let mut value = MySequence::default();
    let (res, decoder) = decode_with(
        &hex!("3080 800122 810548656C6C6F 0001AA 0000"),
        DecoderOptions::default(), &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::TrailerMismatch);
    assert_eq!(decoder.num_unknown_elements_skipped(), 0);
    assert!(decoder.log().contains("malformed end-of-contents"));

    let mut value: Vec<i32> = Vec::new();
    assert_eq!(
        decode(&hex!("3080 020101 2000 0000"), &mut value)
            .unwrap_err().kind(),
        ErrorKind::TrailerMismatch
    );
}

#[test]
fn size_limits() {
    for (max, data, ok) in [
        (0, &hex!("0400")[..], true),
        (4, &hex!("0404 01020304")[..], true),
        (4, &hex!("0405 0102030405")[..], false),
        (5, &hex!("0405 0102030405")[..], true),
    ] {
        let mut value = OctetString::default();
        let (res, decoder) = decode_with(
            data, DecoderOptions::default().with_max_sequence_size(max),
            &mut value
        );
        if ok {
            res.unwrap();
            assert_eq!(value.len(), data.len() - 2);
        }
        else {
            assert_eq!(
                res.unwrap_err().kind(), ErrorKind::SizeLimitExceeded
            );
            assert_eq!(decoder.pos().to_usize(), 2);
        }
    }

    for (max, data, ok) in [
        (0, &hex!("3000")[..], true),
        (0, &hex!("3003 020101")[..], false),
        (2, &hex!("3006 020101 020102")[..], true),
        (2, &hex!("3009 020101 020102 020103")[..], false),
        (2, &hex!("3080 020101 020102 020103 0000")[..], false),
    ] {
        let mut value: Vec<i32> = Vec::new();
        let (res, _) = decode_with(
            data, DecoderOptions::default().with_max_sequence_size(max),
            &mut value
        );
        if ok {
            res.unwrap();
            assert_eq!(value.len(), max);
        }
        else {
            assert_eq!(
                res.unwrap_err().kind(), ErrorKind::SizeLimitExceeded
            );
            assert_eq!(value.len(), max);
        }
    }
}

#[test]
fn skip_primitive_indefinite() {
    let mut value = MySequence::default();
    assert_eq!(
        decode(&hex!("3080 8280 0000 0000"), &mut value).unwrap_err().kind(),
        ErrorKind::CannotSkipPrimitiveIndefinite
    );
}

#[test]
fn skip_field() {
    let data = hex!("3080 A2808201990000 800122 0000 FF");
    let mut decoder = Decoder::from_slice(&data, DecoderOptions::default());
    let mut node = Node::root(decoder.pos());
    node.read_tag_header(&mut decoder).unwrap();
    node.skip_field(&mut decoder).unwrap();
    node.read_tag_trailer(&mut decoder).unwrap();
    assert_eq!(node.total_len(), data.len() - 1);
    assert_eq!(decoder.into_source().remaining(), b"\xFF");

    let mut decoder = Decoder::from_slice(&data, no_skip());
    let mut node = Node::root(decoder.pos());
    node.read_tag_header(&mut decoder).unwrap();
    assert_eq!(
        node.skip_field(&mut decoder).unwrap_err().kind(),
        ErrorKind::SkippingDisabled
    );
    assert_eq!(decoder.severity(), Severity::Error);
}


//------------ Decoder -------------------------------------------------------

#[test]
fn trace_log() {
    let mut value = MySequence::default();
    let (res, decoder) = decode_with(
        &hex!("300A 800122 810548656C6C6F"),
        DecoderOptions::default().with_trace_level(1),
        &mut value
    );
    assert_eq!(res.unwrap(), Outcome::Success);
    assert_eq!(decoder.severity(), Severity::Success);
    let log = decoder.log();
    assert!(log.starts_with(
        "ENTER depth 1: octets [0, 12) CONSTRUCTED SEQUENCE length 10\n"
    ));
    assert!(log.contains(
        "LEAVE depth 2: octets [2, 5) PRIMITIVE [0] length 1 field 'i'\n"
    ));
    assert!(log.ends_with(
        "LEAVE depth 1: octets [0, 12) CONSTRUCTED SEQUENCE length 10\n"
    ));
}

#[test]
fn log_cleared_between_decodes() {
    let data = hex!("300D 820199 800122 810548656C6C6F 020105");
    let mut decoder = Decoder::from_slice(&data, DecoderOptions::default());
    let mut value = MySequence::default();
    assert_eq!(decoder.decode(&mut value).unwrap(), Outcome::Warning);
    assert!(!decoder.log().is_empty());
    let mut number = 0i32;
    assert_eq!(decoder.decode(&mut number).unwrap(), Outcome::Success);
    assert_eq!(number, 5);
    assert!(decoder.log().is_empty());
    assert_eq!(decoder.severity(), Severity::Success);
    assert_eq!(decoder.num_unknown_elements_skipped(), 1);
}

#[test]
fn reader_source() {
    let data = hex!("020105 3080 800122 810548656C6C6F 0000").to_vec();
    let mut decoder = Decoder::from_reader(
        io::Cursor::new(data), DecoderOptions::default()
    );
    let mut number = 0i32;
    decoder.decode(&mut number).unwrap();
    assert_eq!(number, 5);
    let mut value = MySequence::default();
    decoder.decode(&mut value).unwrap();
    assert_eq!(value, hello_sequence());
    assert_eq!(decoder.pos().to_usize(), 17);
    assert!(decoder.decode(&mut number).is_err());
}

#[test]
fn bytes_source() {
    let data = bytes::Bytes::from(hex!("0403010203 020105").to_vec());
    let mut decoder = Decoder::from_bytes(
        data.clone(), DecoderOptions::default()
    );
    let mut value = OctetString::default();
    decoder.decode(&mut value).unwrap();
    assert_eq!(value, [1, 2, 3]);
    assert_eq!(value.as_slice().as_ptr(), data[2..].as_ptr());
    let mut number = 0i32;
    decoder.decode(&mut number).unwrap();
    assert_eq!(number, 5);
    decoder.check_end().unwrap();
}

#[test]
fn trailing_data() {
    let data = hex!("020105 00");
    let mut decoder = Decoder::from_slice(&data, DecoderOptions::default());
    let mut number = 0i32;
    assert_eq!(decoder.decode(&mut number).unwrap(), Outcome::Success);
    let err = decoder.check_end().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    assert_eq!(err.pos().to_usize(), 3);
    assert_eq!(decoder.severity(), Severity::Error);
    assert!(decoder.log().starts_with("ERROR: "));
    assert!(decoder.log().contains("trailing data"));

    let err = decode_slice(
        &data, &DecoderOptions::default(), &mut number
    ).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LengthMismatch);
}

#[test]
fn boxed_target() {
    let mut value: Box<dyn Decodable> = Box::new(MySequence::default());
    decode(&hex!("300A 800122 810548656C6C6F"), &mut value).unwrap();
}


//------------ Dates and Times -----------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct WithDates {
    day: Date,
    at: DatetimeOrDatetimeTz,
}

const WITH_DATES_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("day", 0),
    FieldInfo::new("at", 1),
];

sequence!(WithDates, WITH_DATES_FIELDS, { 0 => day, 1 => at });

#[test]
fn dates_and_times() {
    use time::macros::{date, datetime, offset};

    let mut value = Date::default();
    decode(&hex!("0401 00"), &mut value).unwrap();
    assert_eq!(value, Date(date!(2020-01-01)));

    let mut value = DateOrDateTz::default();
    decode(&hex!("1A0A 323032302D30312D3031"), &mut value).unwrap();
    assert_eq!(value, DateOrDateTz::Date(Date(date!(2020-01-01))));
    decode(
        &hex!("1A10 323032302D30312D30312B30303A3030"), &mut value
    ).unwrap();
    assert_eq!(
        value,
        DateOrDateTz::DateTz(DateTz {
            date: date!(2020-01-01), offset: offset!(UTC)
        })
    );

    let mut value = Vec::<DatetimeOrDatetimeTz>::new();
    decode(
        &hex!(
            "3021 04013A
             1A13 323032302D30312D30315430303A30303A3030
             040701F40000000001"
        ),
        &mut value
    ).unwrap();
    assert_eq!(
        value,
        [
            DatetimeOrDatetimeTz::Datetime(
                Datetime(datetime!(2020-01-01 0:00:00.058))
            ),
            DatetimeOrDatetimeTz::Datetime(
                Datetime(datetime!(2020-01-01 0:00))
            ),
            DatetimeOrDatetimeTz::DatetimeTz(DatetimeTz {
                datetime: datetime!(2020-01-01 0:00:00.001),
                offset: offset!(+8:20),
            }),
        ]
    );

    let mut value = WithDates::default();
    decode(&hex!("3008 800116 81030102FF"), &mut value).unwrap();
    assert_eq!(value.day, Date(date!(2020-01-23)));
    assert_eq!(
        value.at,
        DatetimeOrDatetimeTz::Datetime(
            Datetime(datetime!(2020-01-01 0:01:06.303))
        )
    );

    let mut value = Date::default();
    let (res, decoder) = decode_with(
        &hex!("0C0A 323032302D30312D3031"), DecoderOptions::default(),
        &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::UnexpectedElement);
    assert_eq!(decoder.severity(), Severity::Error);

    let (res, _) = decode_with(
        &hex!("1A0A 323032302D31332D3031"), DecoderOptions::default(),
        &mut value
    );
    assert_eq!(res.unwrap_err().kind(), ErrorKind::InvalidContent);
}
