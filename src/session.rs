//! Session wiring: services, function registrations, and the bridge
//!
//! A session owns one explicitly constructed instance of each service
//! (catalog, order cart, robot, kiosk) and registers every callable function
//! with the dispatch bridge at construction. Nothing here is global; drop
//! the session and the whole state goes with it.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::bridge::{ConversationContext, ConversationMode, DispatchBridge, ToolResult};
use crate::catalog::{Catalog, Category};
use crate::config::Config;
use crate::kiosk::KioskUi;
use crate::order::{Order, OrderCart, PaymentMethod};
use crate::registry::{FunctionRegistry, Handler};
use crate::robot::RobotController;
use crate::schema::{FunctionSchema, ParamSpec};
use crate::{Error, Result};

/// One conversational session: services plus the dispatch bridge
pub struct Session {
    catalog: Arc<Catalog>,
    cart: Arc<Mutex<OrderCart>>,
    robot: Arc<RobotController>,
    kiosk: Arc<Mutex<KioskUi>>,
    bridge: DispatchBridge,
}

impl Session {
    /// Build a session and register the full function set
    ///
    /// # Errors
    ///
    /// Returns an error if the menu file cannot be loaded or a function
    /// name is registered twice (a wiring bug, caught at startup).
    pub fn new(config: &Config) -> Result<Self> {
        let catalog = match &config.menu_path {
            Some(path) => Arc::new(Catalog::from_toml_file(path)?),
            None => Arc::new(Catalog::default()),
        };

        let cart = Arc::new(Mutex::new(OrderCart::new(
            Arc::clone(&catalog),
            config.payment_delay(),
        )));
        let robot = Arc::new(RobotController::new(
            config.robot_battery,
            config.delay_scale,
        ));
        let kiosk = Arc::new(Mutex::new(KioskUi::new(
            Arc::clone(&catalog),
            Arc::clone(&cart),
        )));
        let context = Arc::new(Mutex::new(ConversationContext::default()));

        let mut registry = FunctionRegistry::new();
        register_cafe_functions(&mut registry, &catalog, &cart)?;
        register_robot_functions(&mut registry, &robot)?;
        register_kiosk_functions(&mut registry, &kiosk)?;
        register_system_functions(&mut registry, &cart, &robot, &kiosk, &context)?;

        tracing::info!(functions = registry.len(), "session ready");

        Ok(Self {
            catalog,
            cart,
            robot,
            kiosk,
            bridge: DispatchBridge::new(registry, context),
        })
    }

    /// Dispatch one tool-call event
    pub async fn dispatch(&mut self, name: &str, raw_arguments: &str, call_id: &str) -> ToolResult {
        self.bridge.dispatch(name, raw_arguments, call_id).await
    }

    /// The full function-schema set as a plain JSON document
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a schema cannot be encoded.
    pub fn schema_document(&self) -> Result<Value> {
        self.bridge.registry().schema_document()
    }

    /// The menu catalog
    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The order cart service
    #[must_use]
    pub const fn cart(&self) -> &Arc<Mutex<OrderCart>> {
        &self.cart
    }

    /// The robot controller
    #[must_use]
    pub const fn robot(&self) -> &Arc<RobotController> {
        &self.robot
    }

    /// The kiosk UI controller
    #[must_use]
    pub const fn kiosk(&self) -> &Arc<Mutex<KioskUi>> {
        &self.kiosk
    }

    /// The dispatch bridge
    #[must_use]
    pub const fn bridge(&self) -> &DispatchBridge {
        &self.bridge
    }
}

/// Wrap an async closure into the boxed handler type
fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    Box::new(move |args| Box::pin(f(args)))
}

// Argument extraction helpers. Schema validation is advisory, so these
// re-check presence and shape and fail with a validation error the bridge
// turns into text.

fn arg_str(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn require_str(args: &Value, key: &str) -> Result<String> {
    arg_str(args, key)
        .ok_or_else(|| Error::Validation(format!("missing required parameter '{key}'")))
}

fn arg_u32(args: &Value, key: &str, default: u32) -> Result<u32> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                Error::Validation(format!("parameter '{key}' must be a non-negative integer"))
            }),
    }
}

fn arg_f64(args: &Value, key: &str, default: f64) -> Result<f64> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| Error::Validation(format!("parameter '{key}' must be a number"))),
    }
}

fn arg_f64_opt(args: &Value, key: &str) -> Result<Option<f64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            Error::Validation(format!("parameter '{key}' must be a number"))
        }),
    }
}

fn arg_string_list(args: &Value, key: &str) -> Result<Option<Vec<String>>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(ToString::to_string).ok_or_else(|| {
                    Error::Validation(format!("parameter '{key}' must be an array of strings"))
                })
            })
            .collect::<Result<Vec<String>>>()
            .map(Some),
        Some(_) => Err(Error::Validation(format!(
            "parameter '{key}' must be an array of strings"
        ))),
    }
}

/// Render the menu (or one category of it) for narration
fn render_menu(catalog: &Catalog, category: Option<Category>) -> String {
    let mut out = String::from("CAFE MENU\n");
    let categories: Vec<Category> = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };

    for category in categories {
        let items = catalog.list_by_category(Some(category));
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}:\n", category.label()));
        for item in items {
            out.push_str(&format!("- {} - ${:.2}: {}\n", item.name, item.price, item.description));
            if !item.customizations.is_empty() {
                out.push_str(&format!(
                    "  customizations: {}\n",
                    item.customizations.join(", ")
                ));
            }
        }
    }
    out
}

fn register_cafe_functions(
    registry: &mut FunctionRegistry,
    catalog: &Arc<Catalog>,
    cart: &Arc<Mutex<OrderCart>>,
) -> Result<()> {
    let category_values = ["all", "coffee", "cold_drinks", "pastries", "sandwiches"];

    let catalog_ = Arc::clone(catalog);
    registry.register(
        FunctionSchema::new(
            "get_menu_by_category",
            "Show menu items by category (coffee, cold_drinks, pastries, sandwiches, or all)",
        )
        .param(
            "category",
            ParamSpec::string("Menu category to display").one_of(&category_values),
        ),
        handler(move |args| {
            let catalog = Arc::clone(&catalog_);
            async move {
                let category = arg_str(&args, "category")
                    .filter(|c| c != "all")
                    .and_then(|c| Category::parse(&c));
                Ok(render_menu(&catalog, category))
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new("start_new_order", "Start a new order for a customer").param(
            "customer_name",
            ParamSpec::string("Customer's name (optional)"),
        ),
        handler(move |args| {
            let cart = Arc::clone(&cart_);
            async move {
                let name = arg_str(&args, "customer_name");
                let mut cart = cart.lock().await;
                let order = cart.start_order(name.as_deref())?;
                Ok(format!(
                    "Hello {}! I've started a new order for you (Order #{}). What would you like today?",
                    order.customer_name, order.id
                ))
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new("add_item_to_order", "Add an item to the current order")
            .param("item_name", ParamSpec::string("Name of the menu item to add").required())
            .param("quantity", ParamSpec::integer("Quantity of the item (default: 1)"))
            .param(
                "customizations",
                ParamSpec::string_array("Customizations (e.g. extra_shot, oat_milk)"),
            )
            .param("notes", ParamSpec::string("Special notes or instructions")),
        handler(move |args| {
            let cart = Arc::clone(&cart_);
            async move {
                let name = require_str(&args, "item_name")?;
                let quantity = arg_u32(&args, "quantity", 1)?;
                let customizations = arg_string_list(&args, "customizations")?.unwrap_or_default();
                let notes = arg_str(&args, "notes").unwrap_or_default();

                let mut cart = cart.lock().await;
                let line = cart.add_item(&name, quantity, customizations, notes)?;
                let with = if line.customizations.is_empty() {
                    String::new()
                } else {
                    format!(" with {}", line.customizations.join(", "))
                };
                let line_text = format!(
                    "Added {}x {}{with} to your order (${:.2}).",
                    line.quantity,
                    line.item.name,
                    line.total()
                );
                let total = cart
                    .current_order()
                    .map_or(0.0, |o| o.total);
                Ok(format!("{line_text} Current total: ${total:.2}"))
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new("remove_item_from_order", "Remove an item from the current order")
            .param("item_name", ParamSpec::string("Name of the item to remove").required())
            .param("quantity", ParamSpec::integer("Quantity to remove (default: 1)")),
        handler(move |args| {
            let cart = Arc::clone(&cart_);
            async move {
                let name = require_str(&args, "item_name")?;
                let quantity = arg_u32(&args, "quantity", 1)?;

                let mut cart = cart.lock().await;
                let removed = cart.remove_item(&name, quantity)?;
                let total = cart.current_order().map_or(0.0, |o| o.total);
                if removed.removed_line {
                    Ok(format!(
                        "Removed {} from your order. Current total: ${total:.2}",
                        removed.item_name
                    ))
                } else {
                    Ok(format!(
                        "Reduced {} quantity to {}. Current total: ${total:.2}",
                        removed.item_name, removed.remaining_quantity
                    ))
                }
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new("view_current_order", "View the current order details and total"),
        handler(move |_args| {
            let cart = Arc::clone(&cart_);
            async move {
                let cart = cart.lock().await;
                Ok(cart
                    .current_order()
                    .filter(|o| !o.lines.is_empty())
                    .map_or_else(|| "No active order.".to_string(), Order::summary))
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new(
            "confirm_order",
            "Confirm the current order and calculate preparation time",
        ),
        handler(move |_args| {
            let cart = Arc::clone(&cart_);
            async move {
                let mut cart = cart.lock().await;
                let order = cart.confirm()?;
                let ready = order
                    .estimated_ready_at
                    .map_or_else(|| "soon".to_string(), |t| t.format("%H:%M").to_string());
                Ok(format!(
                    "{}\nOrder confirmed! Estimated ready time: {ready}. Please proceed to payment.",
                    order.summary()
                ))
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new("process_payment", "Process payment for the confirmed order")
            .param(
                "payment_method",
                ParamSpec::string("Payment method").one_of(&["card", "cash", "mobile"]),
            )
            .param(
                "amount",
                ParamSpec::number("Payment amount (optional, defaults to the order total)"),
            ),
        handler(move |args| {
            let cart = Arc::clone(&cart_);
            async move {
                let method = arg_str(&args, "payment_method")
                    .as_deref()
                    .map_or(Some(PaymentMethod::Card), PaymentMethod::parse)
                    .ok_or_else(|| {
                        Error::Validation("payment method must be card, cash, or mobile".to_string())
                    })?;
                let amount = arg_f64_opt(&args, "amount")?;

                let mut cart = cart.lock().await;
                let order = cart.process_payment(method, amount).await?;
                Ok(format!(
                    "Payment of ${:.2} processed via {}. Order #{} is now being prepared.",
                    order.total,
                    method.as_str(),
                    order.id
                ))
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new("cancel_order", "Cancel the current order"),
        handler(move |_args| {
            let cart = Arc::clone(&cart_);
            async move {
                let mut cart = cart.lock().await;
                let id = cart.cancel()?;
                Ok(format!("Order {id} has been cancelled."))
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new("check_order_status", "Check the status of an order").param(
            "order_id",
            ParamSpec::string("Order id to check (optional, defaults to the current order)"),
        ),
        handler(move |args| {
            let cart = Arc::clone(&cart_);
            async move {
                let cart = cart.lock().await;
                match arg_str(&args, "order_id") {
                    Some(order_id) => {
                        let order = cart.find_order(&order_id).ok_or_else(|| {
                            Error::NotFound(format!("order {order_id} not found"))
                        })?;
                        Ok(format!(
                            "Order {}: status {}, payment {}",
                            order.id,
                            order.status.as_str(),
                            order.payment_status.as_str()
                        ))
                    }
                    None => Ok(cart
                        .current_order()
                        .map_or_else(|| "No active order.".to_string(), Order::summary)),
                }
            }
        }),
    )?;

    let catalog_ = Arc::clone(catalog);
    registry.register(
        FunctionSchema::new(
            "get_recommendations",
            "Get menu recommendations based on customer preferences",
        )
        .param(
            "preference",
            ParamSpec::string("Customer preference (coffee, cold, sweet, healthy, filling, ...)"),
        ),
        handler(move |args| {
            let catalog = Arc::clone(&catalog_);
            async move {
                let preference = arg_str(&args, "preference").unwrap_or_default();
                let picks = catalog.recommend(&preference);
                let mut out = String::from("Recommendations for you:\n");
                for item in picks {
                    out.push_str(&format!(
                        "- {} - ${:.2}: {}\n",
                        item.name, item.price, item.description
                    ));
                }
                Ok(out)
            }
        }),
    )?;

    let cart_ = Arc::clone(cart);
    registry.register(
        FunctionSchema::new(
            "modify_order_item",
            "Modify customizations or notes for an item in the current order",
        )
        .param("item_name", ParamSpec::string("Name of the item to modify").required())
        .param(
            "new_customizations",
            ParamSpec::string_array("New customizations for the item"),
        )
        .param("new_notes", ParamSpec::string("New notes for the item")),
        handler(move |args| {
            let cart = Arc::clone(&cart_);
            async move {
                let name = require_str(&args, "item_name")?;
                let customizations = arg_string_list(&args, "new_customizations")?;
                let notes = arg_str(&args, "new_notes");

                let mut cart = cart.lock().await;
                let line = cart.modify_line(&name, customizations, notes)?;
                Ok(format!("Modified {} in your order.", line.item.name))
            }
        }),
    )?;

    Ok(())
}

fn register_robot_functions(
    registry: &mut FunctionRegistry,
    robot: &Arc<RobotController>,
) -> Result<()> {
    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("move_forward", "Move the robot forward by a specified distance")
            .param("distance", ParamSpec::number("Distance in meters (default: 1.0)"))
            .param("speed", ParamSpec::number("Speed in m/s (default: 0.5)")),
        handler(move |args| {
            let robot = Arc::clone(&robot_);
            async move {
                let distance = arg_f64(&args, "distance", 1.0)?;
                let speed = arg_f64(&args, "speed", 0.5)?;
                let state = robot.move_by(distance.abs(), speed).await?;
                Ok(format!(
                    "Moved forward {distance:.1}m. Position: [{:.1}, {:.1}, {:.1}]",
                    state.position[0], state.position[1], state.position[2]
                ))
            }
        }),
    )?;

    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("move_backward", "Move the robot backward by a specified distance")
            .param("distance", ParamSpec::number("Distance in meters (default: 1.0)"))
            .param("speed", ParamSpec::number("Speed in m/s (default: 0.5)")),
        handler(move |args| {
            let robot = Arc::clone(&robot_);
            async move {
                let distance = arg_f64(&args, "distance", 1.0)?;
                let speed = arg_f64(&args, "speed", 0.5)?;
                let state = robot.move_by(-distance.abs(), speed).await?;
                Ok(format!(
                    "Moved backward {distance:.1}m. Position: [{:.1}, {:.1}, {:.1}]",
                    state.position[0], state.position[1], state.position[2]
                ))
            }
        }),
    )?;

    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("turn_left", "Turn the robot left by a specified angle")
            .param("angle", ParamSpec::number("Angle in degrees (default: 90)")),
        handler(move |args| {
            let robot = Arc::clone(&robot_);
            async move {
                let angle = arg_f64(&args, "angle", 90.0)?;
                let state = robot.turn_by(-angle.abs()).await?;
                Ok(format!(
                    "Turned left {angle:.0} degrees. Heading: {:.0}",
                    state.heading_deg
                ))
            }
        }),
    )?;

    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("turn_right", "Turn the robot right by a specified angle")
            .param("angle", ParamSpec::number("Angle in degrees (default: 90)")),
        handler(move |args| {
            let robot = Arc::clone(&robot_);
            async move {
                let angle = arg_f64(&args, "angle", 90.0)?;
                let state = robot.turn_by(angle.abs()).await?;
                Ok(format!(
                    "Turned right {angle:.0} degrees. Heading: {:.0}",
                    state.heading_deg
                ))
            }
        }),
    )?;

    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("stop", "Stop all robot movement immediately"),
        handler(move |_args| {
            let robot = Arc::clone(&robot_);
            async move {
                robot.stop().await;
                Ok("Robot movement stopped.".to_string())
            }
        }),
    )?;

    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new(
            "get_status",
            "Get robot status including position, battery, and movement state",
        ),
        handler(move |_args| {
            let robot = Arc::clone(&robot_);
            async move {
                let state = robot.state().await;
                Ok(format!("Robot status: {}", serde_json::to_string(&state)?))
            }
        }),
    )?;

    let led_values: Vec<&str> = crate::robot::LedColor::ALL.iter().map(|c| c.as_str()).collect();
    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("set_led_color", "Set the robot's LED color").param(
            "color",
            ParamSpec::string("LED color").one_of(&led_values),
        ),
        handler(move |args| {
            let robot = Arc::clone(&robot_);
            async move {
                let color = arg_str(&args, "color").unwrap_or_else(|| "blue".to_string());
                let led = robot.set_led(&color).await?;
                Ok(format!("LED color set to {}.", led.as_str()))
            }
        }),
    )?;

    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("play_sound", "Play a sound effect").param(
            "sound_type",
            ParamSpec::string("Type of sound to play").one_of(&crate::robot::VALID_SOUNDS),
        ),
        handler(move |args| {
            let robot = Arc::clone(&robot_);
            async move {
                let sound = arg_str(&args, "sound_type").unwrap_or_else(|| "beep".to_string());
                let played = robot.play_sound(&sound)?;
                Ok(format!("Played {played} sound."))
            }
        }),
    )?;

    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("take_photo", "Take a photo with the robot's camera"),
        handler(move |_args| {
            let robot = Arc::clone(&robot_);
            async move {
                let filename = robot.take_photo().await;
                Ok(format!("Photo taken and saved as {filename}."))
            }
        }),
    )?;

    let robot_ = Arc::clone(robot);
    registry.register(
        FunctionSchema::new("scan_environment", "Scan the environment for obstacles and objects"),
        handler(move |_args| {
            let robot = Arc::clone(&robot_);
            async move {
                let objects = robot.scan().await;
                let mut out = String::from("Environment scan complete. Detected:\n");
                for object in objects {
                    out.push_str(&format!(
                        "- {} at {:.1}m ({})\n",
                        object.kind, object.distance, object.direction
                    ));
                }
                Ok(out)
            }
        }),
    )?;

    Ok(())
}

fn register_kiosk_functions(
    registry: &mut FunctionRegistry,
    kiosk: &Arc<Mutex<KioskUi>>,
) -> Result<()> {
    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new("display_welcome_screen", "Display the welcome screen on the kiosk"),
        handler(move |_args| {
            let kiosk = Arc::clone(&kiosk_);
            async move { Ok(kiosk.lock().await.show_welcome()) }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new(
            "display_menu_categories",
            "Show menu categories on the kiosk for selection",
        ),
        handler(move |_args| {
            let kiosk = Arc::clone(&kiosk_);
            async move { Ok(kiosk.lock().await.show_categories()) }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new(
            "display_menu_items",
            "Display menu items for a specific category on the kiosk",
        )
        .param(
            "category",
            ParamSpec::string("Category to display (coffee, cold drinks, pastries, sandwiches)")
                .required(),
        ),
        handler(move |args| {
            let kiosk = Arc::clone(&kiosk_);
            async move {
                let category = require_str(&args, "category")?;
                kiosk.lock().await.show_items(&category)
            }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new(
            "highlight_menu_item",
            "Highlight a specific menu item on the kiosk display",
        )
        .param("item_name", ParamSpec::string("Menu item to highlight").required()),
        handler(move |args| {
            let kiosk = Arc::clone(&kiosk_);
            async move {
                let name = require_str(&args, "item_name")?;
                kiosk.lock().await.highlight_item(&name)
            }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new(
            "display_item_details",
            "Show detailed information about a menu item on the kiosk",
        )
        .param("item_name", ParamSpec::string("Menu item to show").required()),
        handler(move |args| {
            let kiosk = Arc::clone(&kiosk_);
            async move {
                let name = require_str(&args, "item_name")?;
                kiosk.lock().await.show_item_detail(&name)
            }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new("display_cart_view", "Show current cart contents on the kiosk"),
        handler(move |_args| {
            let kiosk = Arc::clone(&kiosk_);
            async move { Ok(kiosk.lock().await.show_cart().await) }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new(
            "display_checkout_screen",
            "Display checkout and payment options on the kiosk",
        ),
        handler(move |_args| {
            let kiosk = Arc::clone(&kiosk_);
            async move { kiosk.lock().await.show_checkout().await }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new(
            "display_order_confirmation",
            "Show the order confirmation screen with order details",
        )
        .param("order_id", ParamSpec::string("Order id to display").required()),
        handler(move |args| {
            let kiosk = Arc::clone(&kiosk_);
            async move {
                let order_id = require_str(&args, "order_id")?;
                Ok(kiosk.lock().await.show_confirmation(&order_id))
            }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new("navigate_up", "Move the kiosk highlight up"),
        handler(move |_args| {
            let kiosk = Arc::clone(&kiosk_);
            async move { Ok(kiosk.lock().await.navigate_up().await) }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new("navigate_down", "Move the kiosk highlight down"),
        handler(move |_args| {
            let kiosk = Arc::clone(&kiosk_);
            async move { Ok(kiosk.lock().await.navigate_down().await) }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new(
            "select_highlighted_item",
            "Select the currently highlighted kiosk entry",
        ),
        handler(move |_args| {
            let kiosk = Arc::clone(&kiosk_);
            async move { kiosk.lock().await.select_highlighted() }
        }),
    )?;

    let kiosk_ = Arc::clone(kiosk);
    registry.register(
        FunctionSchema::new("go_back", "Navigate back to the previous kiosk screen"),
        handler(move |_args| {
            let kiosk = Arc::clone(&kiosk_);
            async move { Ok(kiosk.lock().await.back()) }
        }),
    )?;

    Ok(())
}

fn register_system_functions(
    registry: &mut FunctionRegistry,
    cart: &Arc<Mutex<OrderCart>>,
    robot: &Arc<RobotController>,
    kiosk: &Arc<Mutex<KioskUi>>,
    context: &Arc<Mutex<ConversationContext>>,
) -> Result<()> {
    let cart_ = Arc::clone(cart);
    let robot_ = Arc::clone(robot);
    let kiosk_ = Arc::clone(kiosk);
    let context_ = Arc::clone(context);
    registry.register(
        FunctionSchema::new(
            "get_system_status",
            "Get overall system status: robot, cafe, kiosk, and conversation",
        ),
        handler(move |_args| {
            let cart = Arc::clone(&cart_);
            let robot = Arc::clone(&robot_);
            let kiosk = Arc::clone(&kiosk_);
            let context = Arc::clone(&context_);
            async move {
                let robot = robot.state().await;
                let (active_order, completed) = {
                    let cart = cart.lock().await;
                    (cart.current_order().is_some(), cart.history().len())
                };
                let (screen, highlighted) = {
                    let kiosk = kiosk.lock().await;
                    (kiosk.screen(), kiosk.highlighted())
                };
                let context = context.lock().await;

                Ok(format!(
                    "SYSTEM STATUS\n\
                     Robot: position [{:.1}, {:.1}, {:.1}], battery {}%, led {}\n\
                     Cafe: active order: {active_order}, orders completed: {completed}\n\
                     Kiosk: {} screen, highlight {highlighted}\n\
                     Conversation: {} mode, {} interactions",
                    robot.position[0],
                    robot.position[1],
                    robot.position[2],
                    robot.battery,
                    robot.led.as_str(),
                    screen.as_str(),
                    context.mode.as_str(),
                    context.interaction_count
                ))
            }
        }),
    )?;

    let context_ = Arc::clone(context);
    registry.register(
        FunctionSchema::new(
            "switch_mode",
            "Switch conversation mode between general, ordering, or robot_control",
        )
        .param(
            "mode",
            ParamSpec::string("Mode to switch to")
                .one_of(&["general", "ordering", "robot_control"])
                .required(),
        ),
        handler(move |args| {
            let context = Arc::clone(&context_);
            async move {
                let mode_text = require_str(&args, "mode")?;
                let mode = ConversationMode::parse(&mode_text).ok_or_else(|| {
                    Error::Validation(
                        "invalid mode; available modes: general, ordering, robot_control"
                            .to_string(),
                    )
                })?;

                context.lock().await.mode = mode;
                Ok(match mode {
                    ConversationMode::General => {
                        "Switched to general mode. I can help with orders and robot control."
                    }
                    ConversationMode::Ordering => {
                        "Switched to ordering mode. Let's browse the menu and place an order!"
                    }
                    ConversationMode::RobotControl => {
                        "Switched to robot control mode. Ready for movement commands."
                    }
                }
                .to_string())
            }
        }),
    )?;

    Ok(())
}
