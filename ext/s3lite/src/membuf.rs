//! Growable, NUL-terminated response buffer.
//!
//! Used as the `write_io` destination for List/Delete responses and as the
//! `read_io` source for small in-memory request bodies (DeleteObjects).
//! Starts at 8192 bytes, doubling whenever the next write would overflow
//! the current capacity, and always keeps one byte of headroom past the
//! logical length so [`MemBuf::as_nul_terminated_ptr`] can hand a
//! C-string-shaped view to an ABI caller without a copy.

pub struct MemBuf {
    data: Vec<u8>,
}

impl MemBuf {
    const INITIAL_CAPACITY: usize = 8192;

    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Self::new();
        buf.append(bytes);
        buf
    }

    fn ensure_capacity(&mut self, additional: usize) {
        let needed = self.data.len() + additional + 1;
        if self.data.capacity() >= needed {
            return;
        }
        let mut cap = self.data.capacity().max(Self::INITIAL_CAPACITY);
        while cap < needed {
            cap *= 2;
        }
        self.data.reserve_exact(cap - self.data.capacity());
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// A pointer to a NUL byte written just past the logical length,
    /// without changing `len()`. Capacity headroom for this byte is
    /// maintained by `ensure_capacity`.
    pub fn as_nul_terminated_ptr(&mut self) -> *const u8 {
        self.ensure_capacity(0);
        unsafe {
            *self.data.as_mut_ptr().add(self.data.len()) = 0;
        }
        self.data.as_ptr()
    }
}

impl Default for MemBuf {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let buf = MemBuf::new();
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn first_append_reserves_initial_capacity() {
        let mut buf = MemBuf::new();
        buf.append(b"hello");
        assert_eq!(buf.len(), 5);
        assert!(buf.data.capacity() >= MemBuf::INITIAL_CAPACITY);
    }

    #[test]
    fn capacity_doubles_past_initial_size() {
        let mut buf = MemBuf::new();
        buf.append(&vec![0u8; 8192]);
        let cap_after_first = buf.data.capacity();
        assert!(cap_after_first >= MemBuf::INITIAL_CAPACITY * 2);
        buf.append(&vec![0u8; 1]);
        assert_eq!(buf.data.capacity(), cap_after_first);
    }

    #[test]
    fn nul_terminated_pointer_does_not_change_len() {
        let mut buf = MemBuf::from_bytes(b"abc");
        let ptr = buf.as_nul_terminated_ptr();
        assert_eq!(buf.len(), 3);
        unsafe {
            assert_eq!(*ptr.add(3), 0);
        }
    }
}
