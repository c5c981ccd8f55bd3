//! CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use shopfront_core::types::{ChangePasswordRequest, ShippingInfo};
use shopfront_core::{ClientSettings, LoginRequest, Location, Navigator, RegisterRequest};
use shopfront_frontend_common::{AppContext, GuardDecision};
use shopfront_http::{ApiClientBuilder, FileTokenStore, OrdersQuery};
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session tokens
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Ask the server for a long-lived session
        #[arg(long)]
        remember_me: bool,
    },

    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        full_name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored tokens
    Logout,

    /// Show the signed-in user as verified by the server
    Whoami,

    /// Evaluate the navigation guard for a path, e.g. `/checkout`
    CheckRoute { path: String },

    /// Shopping cart operations
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },

    /// List your orders
    Orders {
        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        size: u32,

        #[arg(long, default_value = "createdAt,desc")]
        sort: String,
    },

    /// Turn the cart into an order
    Checkout {
        #[arg(long)]
        full_name: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        state: String,

        #[arg(long)]
        zip_code: String,
    },

    /// Create a payment intent for an order
    Pay {
        order_id: i64,

        /// ISO currency code (defaults to USD)
        #[arg(long)]
        currency: Option<String>,
    },

    /// Profile operations
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
pub enum CartCommands {
    /// Show the cart
    Show,

    /// Add a product
    Add {
        product_id: i64,

        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },

    /// Set the quantity of a product already in the cart
    Update { product_id: i64, quantity: u32 },

    /// Remove a product
    Remove { product_id: i64 },

    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the profile
    Show,

    /// Change the account password
    ChangePassword {
        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        current: String,

        #[arg(long, env = "SHOPFRONT_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
}

/// Reports session redirects on the terminal
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, location: Location) {
        info!(%location, "Redirecting");
        if location.path == shopfront_core::navigation::LOGIN_PATH {
            eprintln!("Session ended, sign in again with `shopfront login`");
        }
    }
}

#[derive(Serialize)]
struct RouteCheck<'a> {
    path: &'a str,
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

/// Build the application context for the configured API
pub fn build_context(settings: &ClientSettings) -> Result<AppContext> {
    let store = FileTokenStore::open(&settings.data_dir).with_context(|| {
        format!("Failed to open credential store in {}", settings.data_dir.display())
    })?;

    let client = ApiClientBuilder::from_settings(&settings.api)
        .token_store(Arc::new(store))
        .navigator(Arc::new(TerminalNavigator))
        .build()?;

    Ok(AppContext::new(client))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Commands {
    pub async fn execute(self, app: &AppContext) -> Result<()> {
        match self {
            Self::Login {
                email,
                password,
                remember_me,
            } => {
                let user = app
                    .session
                    .login(&LoginRequest {
                        email,
                        password,
                        remember_me,
                    })
                    .await?;
                println!("Signed in as {} ({})", user.full_name, user.email);
                Ok(())
            }
            Self::Register {
                full_name,
                email,
                password,
            } => {
                let user = app
                    .session
                    .register(&RegisterRequest {
                        full_name,
                        email,
                        password,
                    })
                    .await?;
                println!("Registered and signed in as {}", user.email);
                Ok(())
            }
            Self::Logout => {
                app.logout().await;
                println!("Signed out");
                Ok(())
            }
            Self::Whoami => {
                if app.session.check_auth().await {
                    print_json(&app.session.user())
                } else {
                    println!("Not signed in");
                    Ok(())
                }
            }
            Self::CheckRoute { path } => {
                let decision = app.guard.before_each(&path).await;
                let redirect = match &decision {
                    GuardDecision::Allow => None,
                    GuardDecision::Redirect(location) => Some(location.to_string()),
                };
                print_json(&RouteCheck {
                    path: &path,
                    allowed: decision.is_allowed(),
                    redirect,
                })
            }
            Self::Cart { command } => command.execute(app).await,
            Self::Orders { page, size, sort } => {
                let orders = app
                    .client
                    .my_orders(&OrdersQuery { page, size, sort })
                    .await?;
                print_json(&orders)
            }
            Self::Checkout {
                full_name,
                address,
                city,
                state,
                zip_code,
            } => {
                let order = app
                    .client
                    .checkout(&ShippingInfo {
                        full_name,
                        address,
                        city,
                        state,
                        zip_code,
                    })
                    .await?;
                // The server empties the cart as part of checkout
                app.cart.reset();
                print_json(&order)
            }
            Self::Pay { order_id, currency } => {
                let payment = app
                    .client
                    .create_payment_intent(order_id, currency.as_deref())
                    .await?;
                print_json(&payment)
            }
            Self::Profile { command } => command.execute(app).await,
        }
    }
}

impl CartCommands {
    pub async fn execute(self, app: &AppContext) -> Result<()> {
        let cart = &app.cart;
        match self {
            Self::Show => cart.fetch_cart().await?,
            Self::Add {
                product_id,
                quantity,
            } => cart.add_to_cart(product_id, quantity).await?,
            Self::Update {
                product_id,
                quantity,
            } => cart.update_cart_item(product_id, quantity).await?,
            Self::Remove { product_id } => cart.remove_from_cart(product_id).await?,
            Self::Clear => cart.clear_cart().await?,
        }

        let state = cart.state();
        for item in &state.items {
            println!(
                "{:>6}  {:<32} {:>3} x {:>8.2} = {:>9.2}",
                item.product_id, item.product_name, item.quantity, item.price, item.subtotal
            );
        }
        println!("{} item(s), total {:.2}", state.item_count(), state.total);
        Ok(())
    }
}

impl ProfileCommands {
    pub async fn execute(self, app: &AppContext) -> Result<()> {
        match self {
            Self::Show => {
                let profile = app.client.get_profile().await?;
                print_json(&profile)
            }
            Self::ChangePassword { current, new } => {
                app.client
                    .change_password(&ChangePasswordRequest {
                        current_password: current,
                        confirm_password: new.clone(),
                        new_password: new,
                    })
                    .await?;
                println!("Password changed");
                Ok(())
            }
        }
    }
}
