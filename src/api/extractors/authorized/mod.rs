/*!
 * Permission-scoped authorization extractor
 *
 * Responsibility:
 * - Run the auth Guard for the permission a handler declares and hand the
 *   verified Claims to the handler
 * - axum glue lives in core; the permission vocabulary lives in types
 *
 * Public API:
 * - Authorized<P>
 * - one marker type per protected operation
 */

mod core;
mod types;

pub use self::core::Authorized;
pub use self::types::{CreateDrink, DeleteDrink, ReadDrinkDetail, UpdateDrink};
