//! Read accessors for tracked variables.
//!
//! A recorder never owns the values it samples. Instead each column holds a
//! [`Probe`] that copies the variable's current bytes on every tick. Probes are
//! usually shared references (`&Cell<f64>`, `&AtomicI32`, ...), so the borrow
//! checker guarantees the variable outlives the session that samples it.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{
    AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicU16, AtomicU32, AtomicU64, AtomicU8, Ordering,
};
use std::sync::Arc;

use crate::blocks::common::TypeTag;

/// Copies the current value of a variable into a sample slot.
pub trait Probe {
    /// Number of bytes written by [`Probe::read_into`].
    fn width(&self) -> usize;

    /// Writes exactly `self.width()` bytes into `out`.
    fn read_into(&self, out: &mut [u8]);
}

/// A probe whose sample type maps onto one of the file's type tags.
pub trait TypedProbe: Probe {
    const TAG: TypeTag;
}

/// Plain numeric values that can be stored as a column sample.
pub trait Scalar: Copy {
    const TAG: TypeTag;
    const WIDTH: usize;

    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_scalar {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const TAG: TypeTag = TypeTag::$tag;
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_scalar! {
    i8 => Int, i16 => Int, i32 => Int,
    u8 => Int, u16 => Int, u32 => Int,
    i64 => Long, u64 => Long,
    f32 => Float, f64 => Double,
}

impl<T: Scalar> Probe for Cell<T> {
    fn width(&self) -> usize {
        T::WIDTH
    }

    #[inline]
    fn read_into(&self, out: &mut [u8]) {
        self.get().write_le(out);
    }
}

impl<T: Scalar> TypedProbe for Cell<T> {
    const TAG: TypeTag = T::TAG;
}

macro_rules! impl_atomic_probe {
    ($($atomic:ty => $ty:ty),* $(,)?) => {
        $(
            impl Probe for $atomic {
                fn width(&self) -> usize {
                    <$ty as Scalar>::WIDTH
                }

                #[inline]
                fn read_into(&self, out: &mut [u8]) {
                    self.load(Ordering::Relaxed).write_le(out);
                }
            }

            impl TypedProbe for $atomic {
                const TAG: TypeTag = <$ty as Scalar>::TAG;
            }
        )*
    };
}

impl_atomic_probe! {
    AtomicI8 => i8, AtomicI16 => i16, AtomicI32 => i32, AtomicI64 => i64,
    AtomicU8 => u8, AtomicU16 => u16, AtomicU32 => u32, AtomicU64 => u64,
}

impl<P: Probe + ?Sized> Probe for &P {
    fn width(&self) -> usize {
        (**self).width()
    }

    #[inline]
    fn read_into(&self, out: &mut [u8]) {
        (**self).read_into(out)
    }
}

impl<P: Probe + ?Sized> Probe for Box<P> {
    fn width(&self) -> usize {
        (**self).width()
    }

    #[inline]
    fn read_into(&self, out: &mut [u8]) {
        (**self).read_into(out)
    }
}

impl<P: Probe + ?Sized> Probe for Rc<P> {
    fn width(&self) -> usize {
        (**self).width()
    }

    #[inline]
    fn read_into(&self, out: &mut [u8]) {
        (**self).read_into(out)
    }
}

impl<P: Probe + ?Sized> Probe for Arc<P> {
    fn width(&self) -> usize {
        (**self).width()
    }

    #[inline]
    fn read_into(&self, out: &mut [u8]) {
        (**self).read_into(out)
    }
}

impl<P: TypedProbe> TypedProbe for &P {
    const TAG: TypeTag = P::TAG;
}

impl<P: TypedProbe> TypedProbe for Rc<P> {
    const TAG: TypeTag = P::TAG;
}

impl<P: TypedProbe> TypedProbe for Arc<P> {
    const TAG: TypeTag = P::TAG;
}

/// Probe backed by a closure that produces the current value.
pub struct FnProbe<F> {
    read: F,
}

/// Wraps a getter closure as a probe, e.g. `probe_fn(|| state.borrow().speed)`.
pub fn probe_fn<T, F>(read: F) -> FnProbe<F>
where
    T: Scalar,
    F: Fn() -> T,
{
    FnProbe { read }
}

impl<T: Scalar, F: Fn() -> T> Probe for FnProbe<F> {
    fn width(&self) -> usize {
        T::WIDTH
    }

    #[inline]
    fn read_into(&self, out: &mut [u8]) {
        (self.read)().write_le(out);
    }
}

impl<T: Scalar, F: Fn() -> T> TypedProbe for FnProbe<F> {
    const TAG: TypeTag = T::TAG;
}
