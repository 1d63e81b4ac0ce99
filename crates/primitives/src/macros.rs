/// Defines a fixed-size byte buffer newtype with hex `Display`/`FromStr`,
/// hex-string serde and borsh support.
#[macro_export]
macro_rules! define_buf {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(
            ::core::clone::Clone,
            ::core::marker::Copy,
            ::core::cmp::PartialEq,
            ::core::cmp::Eq,
            ::core::cmp::PartialOrd,
            ::core::cmp::Ord,
            ::core::hash::Hash,
            ::borsh::BorshSerialize,
            ::borsh::BorshDeserialize,
        )]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Length of the buffer in bytes.
            pub const LEN: usize = $len;

            /// Returns the all-zero buffer.
            pub const fn zero() -> Self {
                Self([0; $len])
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            pub fn as_slice(&self) -> &[u8] {
                &self.0
            }

            /// Builds the buffer from a slice, failing if the width is wrong.
            pub fn try_from_slice(
                buf: &[u8],
            ) -> ::core::result::Result<Self, $crate::errors::BufError> {
                let arr: [u8; $len] =
                    buf.try_into()
                        .map_err(|_| $crate::errors::BufError::InvalidLength {
                            expected: $len,
                            got: buf.len(),
                        })?;
                Ok(Self(arr))
            }
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl ::core::convert::From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl ::core::convert::From<$name> for [u8; $len] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl ::core::convert::AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), $crate::__private::hex::encode(self.0))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "0x{}", $crate::__private::hex::encode(self.0))
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::errors::BufError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = $crate::__private::hex::decode(s)?;
                Self::try_from_slice(&bytes)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S: $crate::__private::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D: $crate::__private::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::core::result::Result<Self, D::Error> {
                let s = <::std::string::String as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err($crate::__private::serde::de::Error::custom)
            }
        }
    };
}
