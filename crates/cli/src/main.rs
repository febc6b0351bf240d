//! Shopfront CLI - Shop the Orders Management API from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (the session is kept in ~/.shopfront/session.json)
//! shopfront login -e admin@orders.com -p admin123
//!
//! # Browse and buy
//! shopfront products list --category Electronics
//! shopfront cart add 3 --quantity 2
//! shopfront orders checkout --address "1 Main St"
//!
//! # Administer the store
//! shopfront admin dashboard
//! shopfront admin set-status 42 shipped
//! ```
//!
//! # Commands
//!
//! - `login`, `register`, `logout`, `whoami`, `profile` - Account
//! - `products` - Catalog browsing and (admin) management
//! - `cart` - Shopping cart
//! - `orders` - Order history, checkout, cancellation
//! - `admin` - Dashboard, all orders, users, payments
//! - `status` - API version and health

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_client::{
    AlertKind, CheckoutRequest, ClientConfig, ClientError, FileStore, NewProduct, Presenter,
    ProductFilters, ProductUpdate, ProfileUpdate, Registration, ReqwestTransport, SessionClient,
};
use shopfront_core::{CartItemId, Email, Money, OrderId, OrderStatus, ProductId, UserId};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

use commands::CliError;
use terminal::{CliNavigator, TerminalPresenter};

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shop the Orders Management API from a terminal")]
struct Cli {
    /// API root, e.g. `http://localhost:5000/api`
    #[arg(long, global = true, env = "SHOPFRONT_API_BASE_URL")]
    api_url: Option<String>,

    /// Where the session is kept between runs
    #[arg(long, global = true, env = "SHOPFRONT_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: Email,

        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        email: Email,

        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,
    },
    /// Forget the session
    Logout,
    /// Show who is logged in
    Whoami,
    /// View or change your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage your cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Your orders
    Orders {
        #[command(subcommand)]
        action: Option<OrderAction>,
    },
    /// Store administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Show the API version and status
    Status,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Fetch your profile from the server
    Show,
    /// Change your name or password
    Update {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Args)]
struct ProductFields {
    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    stock: Option<i64>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    image_url: Option<String>,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List active products
    List {
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product
    Show { id: ProductId },
    /// List product categories
    Categories,
    /// Add a product (admin)
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, value_parser = parse_money)]
        price: Money,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Change a product (admin)
    Update {
        id: ProductId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = parse_money)]
        price: Option<Money>,

        #[arg(long)]
        active: Option<bool>,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Deactivate a product (admin)
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product_id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change the quantity of a cart line
    Update { item_id: CartItemId, quantity: u32 },
    /// Remove a cart line
    Remove { item_id: CartItemId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: OrderId },
    /// Place an order for everything in the cart
    Checkout {
        #[arg(long)]
        address: String,

        #[arg(long, default_value = shopfront_client::orders::DEFAULT_PAYMENT_METHOD)]
        payment_method: String,
    },
    /// Cancel a pending or processing order
    Cancel { id: OrderId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Store statistics and recent orders
    Dashboard,
    /// Every customer's orders
    Orders {
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Move an order to a new status
    SetStatus { id: OrderId, status: OrderStatus },
    /// List all users
    Users,
    /// Activate or deactivate a user
    ToggleUser { id: UserId },
    /// List all payments
    Payments,
}

impl Commands {
    /// The page of the web front-end this command stands in for.
    const fn page(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login.html",
            Self::Register { .. } => "register.html",
            Self::Logout | Self::Whoami | Self::Status => "index.html",
            Self::Profile { .. } => "profile.html",
            Self::Products { .. } => "products.html",
            Self::Cart { .. } => "cart.html",
            Self::Orders { .. } => "orders.html",
            Self::Admin { .. } => "admin.html",
        }
    }
}

fn parse_money(raw: &str) -> Result<Money, String> {
    let amount: Decimal = raw
        .trim()
        .trim_start_matches('$')
        .parse()
        .map_err(|e| format!("invalid amount '{raw}': {e}"))?;
    if amount.is_sign_negative() {
        return Err(format!("amount must not be negative: {raw}"));
    }
    Ok(Money::new(amount))
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed arguments
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shopfront=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let presenter = Arc::new(TerminalPresenter);

    if let Err(e) = run(cli, Arc::clone(&presenter)).await {
        tracing::debug!(error = ?e, "Command failed");
        presenter.show_alert(&e.to_string(), AlertKind::Error);
        if let Some(hint) = e.hint() {
            presenter.show_alert(hint, AlertKind::Info);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, presenter: Arc<TerminalPresenter>) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_base_url(url)?;
    }
    if let Some(path) = cli.session_file {
        config = config.with_session_file(path);
    }

    let transport = ReqwestTransport::new(config.timeout).map_err(ClientError::from)?;
    let store = Arc::new(FileStore::new(config.session_file.clone()));
    let client = SessionClient::builder(config, transport)
        .store(store)
        .navigator(Arc::new(CliNavigator::new(cli.command.page())))
        .presenter(presenter)
        .build()?;

    dispatch(&client, cli.command).await
}

async fn dispatch(client: &SessionClient, command: Commands) -> Result<(), CliError> {
    use commands::{account, admin, cart, catalog, orders};

    match command {
        Commands::Login { email, password } => {
            account::login(client, email.as_str(), SecretString::from(password)).await
        }
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let registration = Registration {
                email: email.into_inner(),
                password: SecretString::from(password),
                first_name,
                last_name,
            };
            account::register(client, registration).await
        }
        Commands::Logout => account::logout(client).await,
        Commands::Whoami => account::whoami(client).await,
        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => account::show_profile(client).await,
            ProfileAction::Update {
                first_name,
                last_name,
                password,
            } => {
                let update = ProfileUpdate {
                    first_name,
                    last_name,
                    password: password.map(SecretString::from),
                };
                account::update_profile(client, update).await
            }
        },
        Commands::Products { action } => match action {
            ProductAction::List { category, search } => {
                catalog::list(client, ProductFilters { category, search }).await
            }
            ProductAction::Show { id } => catalog::show(client, id).await,
            ProductAction::Categories => catalog::categories(client).await,
            ProductAction::Create { name, price, fields } => {
                let product = NewProduct {
                    name,
                    price,
                    description: fields.description,
                    stock_quantity: fields.stock,
                    category: fields.category,
                    image_url: fields.image_url,
                };
                catalog::create(client, product).await
            }
            ProductAction::Update {
                id,
                name,
                price,
                active,
                fields,
            } => {
                let update = ProductUpdate {
                    name,
                    description: fields.description,
                    price,
                    stock_quantity: fields.stock,
                    category: fields.category,
                    image_url: fields.image_url,
                    is_active: active,
                };
                catalog::update(client, id, update).await
            }
            ProductAction::Delete { id } => catalog::delete(client, id).await,
        },
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => cart::show(client).await,
            CartAction::Add {
                product_id,
                quantity,
            } => cart::add(client, product_id, quantity).await,
            CartAction::Update { item_id, quantity } => cart::update(client, item_id, quantity).await,
            CartAction::Remove { item_id } => cart::remove(client, item_id).await,
            CartAction::Clear => cart::clear(client).await,
        },
        Commands::Orders { action } => match action.unwrap_or(OrderAction::List) {
            OrderAction::List => orders::list(client).await,
            OrderAction::Show { id } => orders::show(client, id).await,
            OrderAction::Checkout {
                address,
                payment_method,
            } => {
                let request = CheckoutRequest::new(address).payment_method(payment_method);
                orders::checkout(client, request).await
            }
            OrderAction::Cancel { id } => orders::cancel(client, id).await,
        },
        Commands::Admin { action } => match action {
            AdminAction::Dashboard => admin::dashboard(client).await,
            AdminAction::Orders { status } => admin::orders(client, status).await,
            AdminAction::SetStatus { id, status } => admin::set_status(client, id, status).await,
            AdminAction::Users => admin::users(client).await,
            AdminAction::ToggleUser { id } => admin::toggle_user(client, id).await,
            AdminAction::Payments => admin::payments(client).await,
        },
        Commands::Status => account::status(client).await,
    }
}
