/// Implement the fixed codec for a struct by encoding its fields in order.
#[macro_export]
macro_rules! impl_fixed_encoding {
    ($type:ty, $($field:tt),+) => {
        impl $crate::FixedEncode for $type {
            fn fixed_encode<W: ::std::io::Write + ?Sized>(
                &self,
                w: &mut W,
            ) -> $crate::Result<()> {
                $( $crate::FixedEncode::fixed_encode(&self.$field, w)?; )+
                Ok(())
            }
        }

        impl $crate::FixedDecode for $type {
            fn fixed_decode<R: ::std::io::Read + ?Sized>(r: &mut R) -> $crate::Result<Self> {
                Ok(Self {
                    $( $field: $crate::FixedDecode::fixed_decode(r)?, )+
                })
            }
        }
    };
}

/// Implement the compact codec for a struct by encoding its fields in order.
#[macro_export]
macro_rules! impl_compact_encoding {
    ($type:ty, $($field:tt),+) => {
        impl $crate::CompactEncode for $type {
            fn compact_encode<W: ::std::io::Write + ?Sized>(
                &self,
                w: &mut W,
            ) -> $crate::Result<()> {
                $( $crate::CompactEncode::compact_encode(&self.$field, w)?; )+
                Ok(())
            }
        }

        impl $crate::CompactDecode for $type {
            fn compact_decode<R: ::std::io::Read + ?Sized>(r: &mut R) -> $crate::Result<Self> {
                Ok(Self {
                    $( $field: $crate::CompactDecode::compact_decode(r)?, )+
                })
            }
        }
    };
}

/// Implement both codecs for a struct whose wire layout is its field order.
#[macro_export]
macro_rules! impl_encoding {
    ($type:ty, $($field:tt),+) => {
        $crate::impl_fixed_encoding!($type, $($field),+);
        $crate::impl_compact_encoding!($type, $($field),+);
    };
}
