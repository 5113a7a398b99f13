//! Parent conversion channel abstraction

use crate::error::SampleError;
use crate::Scale;

/// The physical conversion channel shared by all multiplexed inputs.
///
/// Both calls are treated as atomic and blocking. The value returned by
/// `read_raw` belongs to whatever input is routed at the time of the call.
pub trait ParentChannel: Send {
    /// Take one raw sample of the currently routed signal.
    fn read_raw(&mut self) -> Result<i32, SampleError>;

    /// Report the channel scale. Independent of routing.
    fn read_scale(&mut self) -> Result<Scale, SampleError>;
}

impl<T: ParentChannel + ?Sized> ParentChannel for &mut T {
    fn read_raw(&mut self) -> Result<i32, SampleError> {
        (**self).read_raw()
    }

    fn read_scale(&mut self) -> Result<Scale, SampleError> {
        (**self).read_scale()
    }
}

impl<T: ParentChannel + ?Sized> ParentChannel for Box<T> {
    fn read_raw(&mut self) -> Result<i32, SampleError> {
        (**self).read_raw()
    }

    fn read_scale(&mut self) -> Result<Scale, SampleError> {
        (**self).read_scale()
    }
}
