/// Identifies one fetch handed to the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Request(pub u64);

/// Monotonic request id source.
#[derive(Debug, Clone, Default)]
pub struct RequestIds {
    next: u64,
}

impl RequestIds {
    pub fn issue(&mut self) -> Request {
        self.next += 1;
        Request(self.next)
    }
}

/// The one request whose result may reach the render state.
///
/// Beginning a new request supersedes the previous one; a completion is only
/// accepted while its request is still current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSlot {
    current: Option<Request>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the superseded request, if any.
    pub fn begin(&mut self, request: Request) -> Option<Request> {
        self.current.replace(request)
    }

    pub fn cancel(&mut self) -> Option<Request> {
        self.current.take()
    }

    pub fn current(&self) -> Option<Request> {
        self.current
    }

    pub fn is_current(&self, request: Request) -> bool {
        self.current == Some(request)
    }

    /// Clears the slot if `request` is current; reports whether it was.
    pub fn finish(&mut self, request: Request) -> bool {
        if self.is_current(request) {
            self.current = None;
            true
        } else {
            false
        }
    }
}
