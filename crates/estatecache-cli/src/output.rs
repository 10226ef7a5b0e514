//! Plain-text rendering of API records for the terminal.

use estatecache_core::filters::ListState;
use estatecache_core::models::{
    Owner, OwnerWithProperties, PropertyImage, PropertyTrace, PropertyWithDetails, Stats,
};
use estatecache_core::utils::{format_optional, format_price, truncate_string};

const NAME_WIDTH: usize = 28;
const ADDRESS_WIDTH: usize = 32;

fn id_of(id: &Option<String>) -> String {
    format_optional(id, "-")
}

pub fn owner_row(owner: &Owner) -> String {
    format!(
        "{:<24}  {:<28}  {:<32}  {:>3}",
        id_of(&owner.id),
        truncate_string(owner.display_name(), NAME_WIDTH),
        truncate_string(owner.address.as_deref().unwrap_or("-"), ADDRESS_WIDTH),
        owner.age_str(),
    )
}

pub fn print_owners(owners: &[Owner]) {
    if owners.is_empty() {
        println!("No owners.");
        return;
    }
    println!("{:<24}  {:<28}  {:<32}  {:>3}", "ID", "NAME", "ADDRESS", "AGE");
    for owner in owners {
        println!("{}", owner_row(owner));
    }
}

pub fn print_owner(owner: &Owner) {
    println!("{}", owner.display_name());
    println!("  id:       {}", id_of(&owner.id));
    println!("  address:  {}", format_optional(&owner.address, "-"));
    println!("  birthday: {} (age {})", owner.birthday, owner.age_str());
    println!("  photo:    {}", format_optional(&owner.photo, "-"));
}

pub fn print_owner_with_properties(owner: &OwnerWithProperties) {
    print_owner(&owner.owner());
    println!();
    println!(
        "{} properties, portfolio value {}",
        owner.properties.len(),
        format_price(owner.portfolio_value())
    );
    if !owner.properties.is_empty() {
        print_properties(&owner.properties);
    }
}

pub fn property_row(property: &PropertyWithDetails) -> String {
    format!(
        "{:<24}  {:<28}  {:<32}  {:>16}  {:<20}",
        id_of(&property.id),
        truncate_string(property.display_name(), NAME_WIDTH),
        truncate_string(property.address.as_deref().unwrap_or("-"), ADDRESS_WIDTH),
        format_price(property.price),
        truncate_string(property.owner_name().unwrap_or("-"), 20),
    )
}

pub fn print_properties(properties: &[PropertyWithDetails]) {
    if properties.is_empty() {
        println!("No properties match.");
        return;
    }
    println!(
        "{:<24}  {:<28}  {:<32}  {:>16}  {:<20}",
        "ID", "NAME", "ADDRESS", "PRICE", "OWNER"
    );
    for property in properties {
        println!("{}", property_row(property));
    }
}

pub fn print_property(property: &PropertyWithDetails) {
    println!("{}", property.display_name());
    println!("  id:       {}", id_of(&property.id));
    println!("  address:  {}", format_optional(&property.address, "-"));
    println!("  price:    {}", format_price(property.price));
    println!("  code:     {}", format_optional(&property.code_internal, "-"));
    println!("  year:     {}", property.year);
    println!(
        "  owner:    {} ({})",
        property.owner_name().unwrap_or("unknown"),
        format_optional(&property.id_owner, "-")
    );
    println!("  primary:  {}", property.primary_image().unwrap_or("-"));
    if !property.images.is_empty() {
        println!();
        print_images(&property.images);
    }
    if !property.traces.is_empty() {
        println!();
        print_traces(&property.traces);
        println!(
            "  total taxes {}, total sales {}",
            format_price(property.total_taxes()),
            format_price(property.total_sales_value())
        );
    }
}

pub fn print_images(images: &[PropertyImage]) {
    if images.is_empty() {
        println!("No images.");
        return;
    }
    println!("{:<24}  {:<7}  {:<24}  FILE", "ID", "ENABLED", "PROPERTY");
    for image in images {
        println!(
            "{:<24}  {:<7}  {:<24}  {}",
            id_of(&image.id),
            if image.enabled { "yes" } else { "no" },
            id_of(&image.id_property),
            format_optional(&image.file, "-"),
        );
    }
}

pub fn print_traces(traces: &[PropertyTrace]) {
    if traces.is_empty() {
        println!("No traces.");
        return;
    }
    println!(
        "{:<24}  {:<14}  {:<24}  {:>16}  {:>14}",
        "ID", "DATE", "NAME", "VALUE", "TAX"
    );
    for trace in traces {
        println!(
            "{:<24}  {:<14}  {:<24}  {:>16}  {:>14}",
            id_of(&trace.id),
            trace.date_display(),
            truncate_string(trace.name.as_deref().unwrap_or("-"), 24),
            format_price(trace.value),
            format_price(trace.tax),
        );
    }
}

pub fn print_stats(stats: &Stats) {
    println!("Owners:     {}", stats.total_owners);
    println!("Properties: {}", stats.total_properties);
}

pub fn print_list_state(state: &ListState) {
    match state.error {
        Some(ref error) => println!("Error: {}", error),
        None => {
            println!("{} result(s)", state.total_count);
            print_properties(&state.properties);
        }
    }
}
