//! Terminal rendering for command results.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use gems_core::{Cart, Price, Product};
use gems_storefront::checkout::{OrderConfirmation, ValidationErrors};

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products match.");
        return;
    }
    for product in products {
        println!(
            "{:>3}  {:<30} {:>10}  {:<10} {:.1} ({} reviews)",
            product.id,
            product.name,
            Price::store(product.price).to_string(),
            product.category,
            product.rating,
            product.reviews,
        );
    }
}

pub fn cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &cart.items {
        println!(
            "{:<40} {:<30} x{:<4} {:>10}",
            item.id.key(),
            item.name,
            item.quantity,
            Price::store(item.line_total()).to_string(),
        );
        for (key, value) in &item.options {
            println!("    {key}: {value}");
        }
    }
    println!(
        "{} item(s), total {}",
        cart.total_item_count(),
        Price::store(cart.total_price)
    );
}

pub fn validation(errors: &ValidationErrors) {
    eprintln!("Please fix the following fields:");
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

pub fn confirmation(confirmation: &OrderConfirmation) {
    println!("Order confirmed: {}", confirmation.order_number);
    println!(
        "{} item(s), total {}",
        confirmation.item_count,
        Price::store(confirmation.total)
    );
    println!("A confirmation email will be sent to {}", confirmation.email);
}

pub fn success(message: &str) {
    println!("{message}");
}

pub fn failure(message: &str) {
    eprintln!("Error: {message}");
}
