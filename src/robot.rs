//! Simulated mobile-robot controller
//!
//! Movement and turns take simulated time. The `moving` flag is the mutual
//! exclusion: a movement request while one is in flight is rejected with an
//! invalid-state error, never queued. The state lock is released during the
//! simulated motion so the busy rejection is actually observable.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Error, Result};

/// Simulated delays are capped so a long requested move cannot stall the
/// session; the reported distance is still the full request.
const MAX_MOTION_SECS: f64 = 5.0;

/// LED colors the robot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    White,
    Off,
}

impl LedColor {
    /// All valid colors, for error messages and schemas
    pub const ALL: [Self; 7] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Purple,
        Self::White,
        Self::Off,
    ];

    /// Wire/display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::White => "white",
            Self::Off => "off",
        }
    }

    /// Parse from user text
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == normalized)
    }
}

/// Sound effects the robot can play
pub const VALID_SOUNDS: [&str; 5] = ["beep", "chirp", "notification", "alarm", "success"];

/// Robot pose and housekeeping state
#[derive(Debug, Clone, Serialize)]
pub struct RobotState {
    /// Position in meters, origin at startup
    pub position: [f64; 3],

    /// Heading in degrees, 0 at startup, normalized to [0, 360)
    pub heading_deg: f64,

    /// Battery level 0-100
    pub battery: u8,

    /// True while a movement or turn is in flight
    pub moving: bool,

    /// Current LED color
    pub led: LedColor,

    /// When the last action finished
    pub last_action_at: DateTime<Utc>,
}

/// An object reported by an environment scan
#[derive(Debug, Clone, Serialize)]
pub struct ScannedObject {
    /// Object classification
    pub kind: String,

    /// Distance in meters
    pub distance: f64,

    /// Rough direction relative to the robot
    pub direction: String,
}

/// Simulated robot controller
///
/// Constructed per session; shared as `Arc<RobotController>`. Methods take
/// `&self` and guard concurrent motion with the `moving` flag rather than by
/// holding the state lock across the simulated delay.
pub struct RobotController {
    state: Mutex<RobotState>,
    /// Multiplier on all simulated delays; 0 disables them (tests)
    delay_scale: f64,
}

impl RobotController {
    /// Create a robot at the origin
    #[must_use]
    pub fn new(battery: u8, delay_scale: f64) -> Self {
        Self {
            state: Mutex::new(RobotState {
                position: [0.0; 3],
                heading_deg: 0.0,
                battery: battery.min(100),
                moving: false,
                led: LedColor::Blue,
                last_action_at: Utc::now(),
            }),
            delay_scale: delay_scale.max(0.0),
        }
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> RobotState {
        self.state.lock().await.clone()
    }

    /// Move along the x axis; positive distance is forward
    ///
    /// Simulated travel time is `distance / speed`, scaled and capped.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the robot is already moving, `Validation` if the
    /// speed is not positive or the distance is negative.
    pub async fn move_by(&self, distance: f64, speed: f64) -> Result<RobotState> {
        if speed <= 0.0 {
            return Err(Error::Validation("speed must be positive".to_string()));
        }
        if distance.abs() > 1000.0 {
            return Err(Error::Validation(
                "distance must be at most 1000 meters".to_string(),
            ));
        }

        self.begin_motion().await?;
        self.simulate(distance.abs() / speed).await;

        let mut state = self.state.lock().await;
        state.position[0] += distance;
        state.moving = false;
        state.last_action_at = Utc::now();
        tracing::debug!(distance, speed, x = state.position[0], "move complete");
        Ok(state.clone())
    }

    /// Turn in place; positive angle is right (clockwise)
    ///
    /// Turns take a fixed simulated duration regardless of angle.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the robot is already moving.
    pub async fn turn_by(&self, angle_deg: f64) -> Result<RobotState> {
        self.begin_motion().await?;
        self.simulate(1.0).await;

        let mut state = self.state.lock().await;
        state.heading_deg = (state.heading_deg + angle_deg).rem_euclid(360.0);
        state.moving = false;
        state.last_action_at = Utc::now();
        tracing::debug!(angle_deg, heading = state.heading_deg, "turn complete");
        Ok(state.clone())
    }

    /// Stop all movement immediately
    ///
    /// Clears the moving flag; an in-flight simulated motion still applies
    /// its displacement when its delay elapses.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        state.moving = false;
        state.last_action_at = Utc::now();
        tracing::debug!("robot stopped");
    }

    /// Set the LED color
    ///
    /// # Errors
    ///
    /// `Validation` if the color is not one of the fixed set; the message
    /// lists the valid colors.
    pub async fn set_led(&self, color: &str) -> Result<LedColor> {
        let Some(led) = LedColor::parse(color) else {
            let valid: Vec<&str> = LedColor::ALL.iter().map(|c| c.as_str()).collect();
            return Err(Error::Validation(format!(
                "invalid color '{color}'; available colors: {}",
                valid.join(", ")
            )));
        };

        let mut state = self.state.lock().await;
        state.led = led;
        state.last_action_at = Utc::now();
        Ok(led)
    }

    /// Play a sound effect
    ///
    /// # Errors
    ///
    /// `Validation` if the sound is not one of the fixed set.
    pub fn play_sound(&self, sound: &str) -> Result<&'static str> {
        let normalized = sound.trim().to_lowercase();
        VALID_SOUNDS
            .iter()
            .find(|s| **s == normalized)
            .copied()
            .ok_or_else(|| {
                Error::Validation(format!(
                    "invalid sound '{sound}'; available sounds: {}",
                    VALID_SOUNDS.join(", ")
                ))
            })
    }

    /// Scan the environment for obstacles and objects
    ///
    /// Side-effect free apart from simulated latency; results are synthetic.
    pub async fn scan(&self) -> Vec<ScannedObject> {
        self.simulate(2.0).await;

        let mut rng = rand::thread_rng();
        let mut jitter = |base: f64| base + rng.gen_range(-0.5..0.5);
        vec![
            ScannedObject {
                kind: "wall".to_string(),
                distance: jitter(2.5),
                direction: "front".to_string(),
            },
            ScannedObject {
                kind: "chair".to_string(),
                distance: jitter(1.8),
                direction: "left".to_string(),
            },
            ScannedObject {
                kind: "person".to_string(),
                distance: jitter(3.2),
                direction: "right".to_string(),
            },
        ]
    }

    /// Take a photo; returns the simulated file name
    pub async fn take_photo(&self) -> String {
        self.simulate(1.0).await;
        format!("photo_{}.jpg", Utc::now().timestamp())
    }

    /// Claim the moving flag or reject while already moving
    async fn begin_motion(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.moving {
            return Err(Error::InvalidState(
                "robot is already moving; wait for it to finish".to_string(),
            ));
        }
        state.moving = true;
        Ok(())
    }

    /// Sleep for a scaled, capped simulated duration
    async fn simulate(&self, secs: f64) {
        let secs = (secs * self.delay_scale).min(MAX_MOTION_SECS * self.delay_scale.max(1.0));
        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}
