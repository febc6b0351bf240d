//! Terminal implementations of the client's presentation and navigation
//! hooks, plus plain-text rendering of API records.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::IsTerminal;
use std::sync::{Mutex, PoisonError};

use shopfront_client::ui::{format_currency, format_date};
use shopfront_client::{AlertKind, CartSnapshot, Navigator, Order, Payment, Presenter, Product, User};

/// Prints alerts: successes and info to stdout, warnings and errors to
/// stderr.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn show_alert(&self, message: &str, kind: AlertKind) {
        match kind {
            AlertKind::Success => println!("✓ {message}"),
            AlertKind::Info => println!("{message}"),
            AlertKind::Warning => eprintln!("warning: {message}"),
            AlertKind::Error => eprintln!("error: {message}"),
        }
    }

    fn show_loading(&self) {
        if std::io::stderr().is_terminal() {
            eprint!("Loading...\r");
        }
    }

    fn hide_loading(&self) {
        if std::io::stderr().is_terminal() {
            eprint!("          \r");
        }
    }

    fn update_cart_badge(&self, count: usize) {
        tracing::debug!(count, "Cart badge");
    }
}

/// Stands in for the browser location: each command runs "on" the page it
/// replaces, and a redirect just moves that marker.
#[derive(Debug)]
pub struct CliNavigator {
    page: Mutex<String>,
}

impl CliNavigator {
    pub fn new(page: &str) -> Self {
        Self {
            page: Mutex::new(page.to_string()),
        }
    }
}

impl Navigator for CliNavigator {
    fn current_page(&self) -> String {
        self.page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn redirect(&self, page: &str) {
        tracing::debug!(page, "Redirect");
        *self.page.lock().unwrap_or_else(PoisonError::into_inner) = page.to_string();
    }
}

// =============================================================================
// Rendering
// =============================================================================

pub fn print_user(user: &User) {
    println!("#{} {}", user.id, user.display_name());
    if let Some(email) = &user.email {
        println!("  email:  {email}");
    }
    println!("  role:   {}", user.role);
    println!("  active: {}", if user.is_active { "yes" } else { "no" });
    if let Some(created) = &user.created_at {
        println!("  since:  {}", format_date(created));
    }
}

pub fn print_users(users: &[User]) {
    for user in users {
        let email = user.email.as_ref().map_or("-", |e| e.as_str());
        let active = if user.is_active { "" } else { " (inactive)" };
        println!(
            "#{:<5} {:<30} {:<6}{active}",
            user.id.to_string(),
            email,
            user.role.as_str()
        );
    }
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in products {
        let stock = if product.in_stock() {
            format!("{} in stock", product.stock_quantity)
        } else {
            "out of stock".to_string()
        };
        println!(
            "#{:<5} {:<32} {:>10}  {stock}",
            product.id.to_string(),
            product.name,
            format_currency(product.price)
        );
    }
}

pub fn print_product(product: &Product) {
    println!("#{} {}", product.id, product.name);
    println!("  price:    {}", format_currency(product.price));
    println!("  stock:    {}", product.stock_quantity);
    if let Some(category) = product.category.as_deref().filter(|c| !c.is_empty()) {
        println!("  category: {category}");
    }
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {description}");
    }
}

pub fn print_cart(cart: &CartSnapshot) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &cart.items {
        let name = item.product.as_ref().map_or("(unavailable)", |p| p.name.as_str());
        println!(
            "#{:<5} {:<32} x{:<3} {:>10}",
            item.id.to_string(),
            name,
            item.quantity,
            format_currency(item.subtotal)
        );
    }
    println!("{} line(s), total {}", cart.count, format_currency(cart.total));
}

pub fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for order in orders {
        let date = order.created_at.as_ref().map_or_else(String::new, format_date);
        println!(
            "#{:<5} {:<12} {:>10}  {date}",
            order.id.to_string(),
            order.status.as_str(),
            format_currency(order.total_amount)
        );
    }
}

pub fn print_order(order: &Order) {
    println!("Order #{} ({})", order.id, order.status);
    if let Some(created) = &order.created_at {
        println!("  placed:  {}", format_date(created));
    }
    if let Some(address) = order.shipping_address.as_deref().filter(|a| !a.is_empty()) {
        println!("  ship to: {address}");
    }
    for item in &order.items {
        let name = item
            .product
            .as_ref()
            .map_or_else(|| format!("product #{}", item.product_id), |p| p.name.clone());
        println!(
            "  {:<32} x{:<3} {:>10}",
            name,
            item.quantity,
            format_currency(item.line_total())
        );
    }
    println!("  total:   {}", format_currency(order.total_amount));
    if let Some(payment) = &order.payment {
        println!(
            "  payment: {} ({})",
            payment.payment_status,
            payment.payment_method.as_deref().unwrap_or("unknown")
        );
    }
}

pub fn print_payments(payments: &[Payment]) {
    for payment in payments {
        println!(
            "#{:<5} order #{:<5} {:>10}  {:<10} {}",
            payment.id.to_string(),
            payment.order_id.to_string(),
            format_currency(payment.amount),
            payment.payment_status.as_str(),
            payment.transaction_id.as_deref().unwrap_or("-")
        );
    }
}

pub fn print_line(line: &str) {
    println!("{line}");
}
