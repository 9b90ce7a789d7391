//! Cafebot gateway: function-calling bridge for a cafe kiosk / robot demo
//!
//! Sits between a realtime conversational agent and a set of simulated
//! subsystems: a menu catalog, an order cart, a mobile robot, and a kiosk
//! display. The agent issues tool calls by name with JSON arguments; the
//! dispatch bridge validates each call, runs the registered handler exactly
//! once, and returns a textual result keyed by the originating call id.
//!
//! - [`catalog`]: immutable menu data and fuzzy name lookup
//! - [`order`]: the single in-progress order and its lifecycle
//! - [`robot`]: simulated robot movement, LEDs, sounds, and sensors
//! - [`kiosk`]: kiosk display state machine over the live cart
//! - [`schema`]: function parameter schemas and advisory validation
//! - [`registry`]: name-to-handler registry populated at session start
//! - [`bridge`]: the dispatch boundary where errors become text
//! - [`session`]: per-session wiring of services and registrations
//! - [`config`]: gateway configuration

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod error;
pub mod kiosk;
pub mod order;
pub mod registry;
pub mod robot;
pub mod schema;
pub mod session;

pub use bridge::{ConversationContext, ConversationMode, DispatchBridge, ToolResult};
pub use catalog::{Catalog, Category, MenuItem};
pub use config::Config;
pub use error::{Error, Result};
pub use kiosk::{KioskUi, Screen};
pub use order::{Order, OrderCart, OrderLine, OrderStatus, PaymentMethod, PaymentStatus};
pub use registry::{FunctionRegistry, Handler, HandlerFuture};
pub use robot::{LedColor, RobotController, RobotState};
pub use schema::{FunctionSchema, ParamSpec, ParamType};
pub use session::Session;
