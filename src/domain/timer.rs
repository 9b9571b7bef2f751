use crate::domain::models::parse_leading_int;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    AwaitingConfirmation,
    Completed,
}

impl TimerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Completed => "completed",
        }
    }
}

/// One subroutine's countdown. The duration's numeric prefix is a whole
/// number of minutes; a duration without one is corrupt data and refuses to
/// build a timer rather than counting down from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineTimer {
    initial_seconds: u64,
    remaining_seconds: u64,
    phase: TimerPhase,
}

impl SubroutineTimer {
    pub fn from_duration(duration: &str) -> Result<Self, String> {
        let minutes = duration
            .split_whitespace()
            .next()
            .and_then(parse_leading_int)
            .ok_or_else(|| format!("duration '{duration}' has no leading number of minutes"))?;
        let initial_seconds = minutes * 60;
        Ok(Self {
            initial_seconds,
            remaining_seconds: initial_seconds,
            phase: TimerPhase::Idle,
        })
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn initial_seconds(&self) -> u64 {
        self.initial_seconds
    }

    pub fn start(&mut self) -> Result<(), String> {
        if self.phase != TimerPhase::Idle {
            return Err("timer must be idle before start".to_string());
        }
        self.phase = TimerPhase::Running;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), String> {
        if self.phase != TimerPhase::Running {
            return Err("timer is not running".to_string());
        }
        self.phase = TimerPhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), String> {
        if self.phase != TimerPhase::Paused {
            return Err("timer is not paused".to_string());
        }
        self.phase = TimerPhase::Running;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.remaining_seconds = self.initial_seconds;
        self.phase = TimerPhase::Idle;
    }

    /// One-second advance. Only a running timer moves; hitting zero asks for
    /// an explicit completion confirmation instead of completing on its own.
    pub fn tick(&mut self) -> TimerPhase {
        if self.phase == TimerPhase::Running {
            if self.remaining_seconds > 0 {
                self.remaining_seconds -= 1;
            }
            if self.remaining_seconds == 0 {
                self.phase = TimerPhase::AwaitingConfirmation;
            }
        }
        self.phase
    }

    /// The user's explicit confirmation, allowed from any live phase — the
    /// Complete control is available before the countdown runs out.
    pub fn confirm_complete(&mut self) -> Result<(), String> {
        if self.phase == TimerPhase::Completed {
            return Err("timer is already completed".to_string());
        }
        self.remaining_seconds = 0;
        self.phase = TimerPhase::Completed;
        Ok(())
    }

    pub fn progress(&self) -> f64 {
        if self.initial_seconds == 0 {
            return 0.0;
        }
        (self.remaining_seconds as f64 / self.initial_seconds as f64).clamp(0.0, 1.0)
    }
}
