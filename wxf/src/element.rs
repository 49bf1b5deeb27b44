//! Native Rust types that can be stored in packed and numeric arrays.
use crate::tag::ElementType;

/// A complex number stored as two consecutive components, real part first.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

/// A fixed-width element with a little-endian wire representation.
///
/// The element type tag is a function of the Rust type alone, so pushing `&[T]` always selects the
/// same tag.
pub trait ArrayElement: Copy {
    const ELEMENT: ElementType;
    const WIDTH: usize = Self::ELEMENT.width();

    /// Append the little-endian bytes of `self`.
    fn write_le(&self, out: &mut Vec<u8>);

    /// Read one element from exactly [`Self::WIDTH`] bytes.
    ///
    /// Callers guarantee the slice length; no alignment is assumed.
    fn read_le(bytes: &[u8]) -> Self;
}

/// Marker for elements admitted by packed arrays (every kind except unsigned integers).
pub trait PackedElement: ArrayElement {}

macro_rules! impl_scalar_element {
    ($($ty:ty => $element:ident;)*) => {
        $(
            impl ArrayElement for $ty {
                const ELEMENT: ElementType = ElementType::$element;

                #[inline]
                fn write_le(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_scalar_element! {
    i8 => Integer8;
    i16 => Integer16;
    i32 => Integer32;
    i64 => Integer64;
    u8 => UnsignedInteger8;
    u16 => UnsignedInteger16;
    u32 => UnsignedInteger32;
    u64 => UnsignedInteger64;
    f32 => Real32;
    f64 => Real64;
}

impl PackedElement for i8 {}
impl PackedElement for i16 {}
impl PackedElement for i32 {}
impl PackedElement for i64 {}
impl PackedElement for f32 {}
impl PackedElement for f64 {}

macro_rules! impl_complex_element {
    ($($ty:ty => $element:ident;)*) => {
        $(
            impl ArrayElement for Complex<$ty> {
                const ELEMENT: ElementType = ElementType::$element;

                #[inline]
                fn write_le(&self, out: &mut Vec<u8>) {
                    self.re.write_le(out);
                    self.im.write_le(out);
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let half = std::mem::size_of::<$ty>();
                    Complex {
                        re: <$ty>::read_le(&bytes[..half]),
                        im: <$ty>::read_le(&bytes[half..2 * half]),
                    }
                }
            }

            impl PackedElement for Complex<$ty> {}
        )*
    };
}

impl_complex_element! {
    f32 => ComplexReal32;
    f64 => ComplexReal64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_native_sizes() {
        assert_eq!(<i8 as ArrayElement>::WIDTH, 1);
        assert_eq!(<u16 as ArrayElement>::WIDTH, 2);
        assert_eq!(<f32 as ArrayElement>::WIDTH, 4);
        assert_eq!(<i64 as ArrayElement>::WIDTH, 8);
        assert_eq!(<Complex<f32> as ArrayElement>::WIDTH, 8);
        assert_eq!(<Complex<f64> as ArrayElement>::WIDTH, 16);
        assert_eq!(
            <Complex<f64> as ArrayElement>::WIDTH,
            std::mem::size_of::<Complex<f64>>()
        );
    }

    #[test]
    fn little_endian_layout() {
        let mut out = Vec::new();
        0x0102_0304_i32.write_le(&mut out);
        assert_eq!(out, [4, 3, 2, 1]);
        assert_eq!(i32::read_le(&out), 0x0102_0304);

        out.clear();
        Complex::new(1.5f32, -2.0f32).write_le(&mut out);
        assert_eq!(out.len(), 8);
        assert_eq!(&out[..4], &1.5f32.to_le_bytes());
        assert_eq!(Complex::<f32>::read_le(&out), Complex::new(1.5, -2.0));
    }

    #[test]
    fn read_ignores_alignment() {
        let buf = [0xFFu8, 0x2A, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(u64::read_le(&buf[1..]), 42);
    }
}
