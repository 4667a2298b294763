//! The two countdown timers of the chip.
//!
//! Both count down by one per tick until they reach zero. The host decides how often a
//! tick happens by running cycles, the timers themselves never look at a clock.

#[cfg_attr(test, mockall::automock)]
/// Is called once the timer has reached zero.
pub trait TimerCallback {
    /// Will handle the event, for the sound timer this is the beep.
    fn handle(&mut self);
}

/// A callback doing nothing, used for the delay timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn handle(&mut self) {}
}

impl TimerCallback for Box<dyn TimerCallback + Send> {
    fn handle(&mut self) {
        (**self).handle()
    }
}

/// Represents a timer inside of the chip
/// infrastruture, it will count down to
/// zero from what ever number given.
pub struct Timer<S: TimerCallback = NoCallback> {
    /// will store the value of the timer
    value: u8,
    /// fired on the transition to zero
    callback: S,
}

impl Timer<NoCallback> {
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self {
        Self::with_callback(value, NoCallback)
    }
}

impl<S: TimerCallback> Timer<S> {
    /// Will create a new timer with the given value and callback.
    pub fn with_callback(value: u8, callback: S) -> Self {
        Self { value, callback }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Will count down by one, if the timer is still running.
    ///
    /// Returns true and runs the callback exactly when the timer went from one to zero.
    pub fn tick(&mut self) -> bool {
        if self.value == 0 {
            return false;
        }
        self.value -= 1;
        if self.value == 0 {
            self.callback.handle();
            true
        } else {
            false
        }
    }
}

impl<S: TimerCallback> std::fmt::Debug for Timer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer").field("value", &self.value).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_down_to_zero() {
        let mut timer = Timer::new(3);
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick());
        assert_eq!(timer.get_value(), 0);

        // never goes below zero
        assert!(!timer.tick());
        assert_eq!(timer.get_value(), 0);
    }

    #[test]
    fn test_callback_fires_once() {
        let mut callback = MockTimerCallback::new();
        callback.expect_handle().times(1).return_const(());

        let mut timer = Timer::with_callback(1, callback);
        assert!(timer.tick());
        assert!(!timer.tick());
        assert!(!timer.tick());
    }

    #[test]
    fn test_callback_refire_after_reset() {
        let mut callback = MockTimerCallback::new();
        callback.expect_handle().times(2).return_const(());

        let mut timer = Timer::with_callback(2, callback);
        timer.tick();
        timer.tick();
        timer.set_value(1);
        timer.tick();
        assert_eq!(timer.get_value(), 0);
    }

    #[test]
    fn test_boxed_callback() {
        let mut callback = MockTimerCallback::new();
        callback.expect_handle().times(1).return_const(());
        let boxed: Box<dyn TimerCallback + Send> = Box::new(callback);

        let mut timer = Timer::with_callback(1, boxed);
        assert!(timer.tick());
    }
}
