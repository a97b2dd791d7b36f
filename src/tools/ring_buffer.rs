//! Ring buffer for LZ type compression windows
use num_traits::PrimInt;

pub struct RingBuffer<T: PrimInt> {
    buf: Vec<T>,
    n: usize
}

impl <T: PrimInt> RingBuffer<T> {
    pub fn create(fill: T,n: usize) -> Self {
        Self {
            buf: vec![fill;n],
            n
        }
    }
    /// get value at absolute position, cursor does not move
    pub fn get_abs(&self,abs: usize) -> T {
        self.buf[abs % self.n]
    }
    /// set value at absolute position, cursor does not move
    pub fn set_abs(&mut self,abs: usize,val: T) {
        self.buf[abs % self.n] = val;
    }
}

#[test]
fn wraps_on_absolute_access() {
    let mut ring: RingBuffer<u8> = RingBuffer::create(0,4);
    ring.set_abs(5,9);
    assert_eq!(ring.get_abs(1),9);
    assert_eq!(ring.get_abs(5),9);
}

#[test]
fn independent_slots_keep_their_value() {
    let mut ring: RingBuffer<u8> = RingBuffer::create(0,4);
    ring.set_abs(0,1);
    ring.set_abs(1,2);
    ring.set_abs(2,3);
    ring.set_abs(3,4);
    assert_eq!(ring.get_abs(4),1);
    assert_eq!(ring.get_abs(7),4);
}
