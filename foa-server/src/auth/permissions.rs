//! Permission Definitions
//!
//! Roles map to fixed permission sets. Route groups are gated with
//! `require_permission`, handlers that act on the caller's own data use the
//! `:own` permissions.

pub const CUSTOMER_ROLE: &str = "customer";

/// Every permission a route can require
pub const ALL_PERMISSIONS: &[&str] = &[
    // Customer self-service
    "cart:read",
    "cart:write",
    "orders:own",
    "messages:own",
    "profile:own",
    // Staff
    "catalog:read",
    "catalog:write",
    "locations:read",
    "locations:write",
    "orders:read",
    "orders:write",
    "customers:read",
    "customers:write",
    "staff:read",
    "staff:write",
    "messages:read",
    "messages:write",
    "analytics:read",
    "exports:read",
];

pub const CUSTOMER_PERMISSIONS: &[&str] = &["cart:*", "orders:own", "messages:own", "profile:own"];

/// Super staff: everything
pub const SUPER_PERMISSIONS: &[&str] = &["all"];

/// Admin staff: day-to-day operations, read-only roster
pub const ADMIN_PERMISSIONS: &[&str] = &[
    "catalog:*",
    "locations:*",
    "orders:*",
    "customers:*",
    "messages:*",
    "analytics:read",
    "exports:read",
    "staff:read",
];

/// Delivery staff: see orders
pub const DELIVERY_PERMISSIONS: &[&str] = &["orders:read"];

/// Get permissions for a role name
pub fn permissions_for_role(role: &str) -> Vec<String> {
    let set = match role {
        CUSTOMER_ROLE => CUSTOMER_PERMISSIONS,
        "super" => SUPER_PERMISSIONS,
        "admin" => ADMIN_PERMISSIONS,
        "deliveryGuy" => DELIVERY_PERMISSIONS,
        _ => &[],
    };
    set.iter().map(|s| s.to_string()).collect()
}

/// Validate if a permission string is known
pub fn is_valid_permission(permission: &str) -> bool {
    permission == "all" || ALL_PERMISSIONS.contains(&permission) || permission.ends_with(":*")
}
