//! Scripted collaborators for host tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use fibonacci_clock::{
    ClockSource, Duration, FetchError, InputPins, Instant, NetworkStack, Rgb, StripDriver,
    TimeProtocolClient, Timestamp,
};

/// Strip driver keeping every written buffer
#[derive(Clone, Default)]
pub struct RecordingStrip {
    pub writes: Rc<RefCell<Vec<Vec<Rgb>>>>,
    pub fail: Rc<RefCell<bool>>,
}

impl RecordingStrip {
    pub fn last(&self) -> Option<Vec<Rgb>> {
        self.writes.borrow().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.borrow_mut() = fail;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteError;

impl StripDriver for RecordingStrip {
    type Error = WriteError;

    fn write(&mut self, colors: &[Rgb]) -> Result<(), WriteError> {
        self.writes.borrow_mut().push(colors.to_vec());
        if *self.fail.borrow() {
            return Err(WriteError);
        }
        Ok(())
    }
}

/// How the fake network answers a connect call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectBehavior {
    /// Link comes up right away
    Associate,
    /// Call succeeds but the link never comes up
    Pending,
    /// Call reports a timeout
    TimeOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectTimedOut;

pub struct FakeNetwork {
    pub script: VecDeque<ConnectBehavior>,
    pub fallback: ConnectBehavior,
    pub connected: bool,
    pub attempts: usize,
}

impl FakeNetwork {
    pub fn always(behavior: ConnectBehavior) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: behavior,
            connected: false,
            attempts: 0,
        }
    }

    pub fn scripted(script: &[ConnectBehavior], fallback: ConnectBehavior) -> Self {
        Self {
            script: script.iter().copied().collect(),
            ..Self::always(fallback)
        }
    }
}

impl NetworkStack for FakeNetwork {
    type Error = ConnectTimedOut;

    fn connect(&mut self, _ssid: &str, _password: &str, _timeout: Duration) -> Result<(), ConnectTimedOut> {
        self.attempts += 1;
        match self.script.pop_front().unwrap_or(self.fallback) {
            ConnectBehavior::Associate => {
                self.connected = true;
                Ok(())
            }
            ConnectBehavior::Pending => Ok(()),
            ConnectBehavior::TimeOut => Err(ConnectTimedOut),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

pub struct FakeTimeClient {
    pub script: VecDeque<Result<Timestamp, FetchError>>,
    pub fallback: Result<Timestamp, FetchError>,
    pub requests: usize,
    pub hosts: Vec<String>,
}

impl FakeTimeClient {
    pub fn always(answer: Result<Timestamp, FetchError>) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: answer,
            requests: 0,
            hosts: Vec::new(),
        }
    }

    pub fn scripted(script: &[Result<Timestamp, FetchError>], fallback: Result<Timestamp, FetchError>) -> Self {
        Self {
            script: script.iter().copied().collect(),
            ..Self::always(fallback)
        }
    }
}

impl TimeProtocolClient for FakeTimeClient {
    fn fetch(&mut self, host: &str, _timeout: Duration) -> Result<Timestamp, FetchError> {
        self.requests += 1;
        self.hosts.push(host.to_string());
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

#[derive(Clone, Default)]
pub struct FakeClock {
    pub now: Rc<RefCell<Timestamp>>,
    pub set_calls: Rc<RefCell<Vec<Timestamp>>>,
}

impl FakeClock {
    pub fn at(timestamp: Timestamp) -> Self {
        let clock = Self::default();
        *clock.now.borrow_mut() = timestamp;
        clock
    }

    pub fn advance(&self, seconds: u64) {
        *self.now.borrow_mut() += seconds;
    }
}

impl ClockSource for FakeClock {
    fn now(&self) -> Timestamp {
        *self.now.borrow()
    }

    fn set(&mut self, timestamp: Timestamp) {
        self.set_calls.borrow_mut().push(timestamp);
        *self.now.borrow_mut() = timestamp;
    }
}

/// Pull-up pins, every pin reads high unless pressed
#[derive(Clone, Default)]
pub struct FakePins {
    pub low: Rc<RefCell<Vec<u8>>>,
}

impl FakePins {
    pub fn press(&self, pin: u8) {
        let mut low = self.low.borrow_mut();
        if !low.contains(&pin) {
            low.push(pin);
        }
    }

    pub fn release(&self, pin: u8) {
        self.low.borrow_mut().retain(|low| *low != pin);
    }
}

impl InputPins for FakePins {
    fn read_level(&mut self, pin: u8) -> bool {
        !self.low.borrow().contains(&pin)
    }
}

pub fn ms(millis: u64) -> Instant {
    Instant::from_millis(millis)
}
