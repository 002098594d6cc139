//! Fixed-length byte buffers used for ids, addresses and keys.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};

macro_rules! impl_buf_core {
    ($name:ident, $len:expr) => {
        #[derive(
            Clone,
            Copy,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
            Arbitrary,
            BorshSerialize,
            BorshDeserialize,
        )]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn new(data: [u8; $len]) -> Self {
                Self(data)
            }

            pub const fn zero() -> Self {
                Self([0u8; $len])
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl ::std::convert::From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl ::std::convert::From<$name> for [u8; $len] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl ::std::convert::AsRef<[u8; $len]> for $name {
            fn as_ref(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl ::std::convert::TryFrom<&[u8]> for $name {
            type Error = crate::errors::ParseError;

            fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
                let arr: [u8; $len] = value
                    .try_into()
                    .map_err(|_| crate::errors::ParseError::InvalidLength {
                        expected: $len,
                        got: value.len(),
                    })?;
                Ok(Self(arr))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&::hex::encode(self.0))
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&::hex::encode(self.0))
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                if s.is_human_readable() {
                    s.serialize_str(&::hex::encode(self.0))
                } else {
                    s.serialize_bytes(&self.0)
                }
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                use ::serde::de::Error;
                if d.is_human_readable() {
                    let s = <String as ::serde::Deserialize>::deserialize(d)?;
                    let raw = ::hex::decode(&s).map_err(D::Error::custom)?;
                    Self::try_from(raw.as_slice()).map_err(D::Error::custom)
                } else {
                    let raw = <Vec<u8> as ::serde::Deserialize>::deserialize(d)?;
                    Self::try_from(raw.as_slice()).map_err(D::Error::custom)
                }
            }
        }
    };
}

impl_buf_core!(Buf20, 20);
impl_buf_core!(Buf32, 32);
impl_buf_core!(Buf33, 33);
impl_buf_core!(Buf64, 64);
