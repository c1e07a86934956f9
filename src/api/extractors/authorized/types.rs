/*
 * Responsibility
 * - Permission strings the drinks API checks, one marker type each
 * - Handlers name the marker in their signature: `Authorized<CreateDrink>`
 */

/// A permission string a handler requires, known at compile time.
pub trait RequiredPermission: Send + Sync + 'static {
    const NAME: &'static str;
}

#[derive(Debug)]
pub struct ReadDrinkDetail;

impl RequiredPermission for ReadDrinkDetail {
    const NAME: &'static str = "get:drinks-detail";
}

#[derive(Debug)]
pub struct CreateDrink;

impl RequiredPermission for CreateDrink {
    const NAME: &'static str = "post:drinks";
}

#[derive(Debug)]
pub struct UpdateDrink;

impl RequiredPermission for UpdateDrink {
    const NAME: &'static str = "patch:drinks";
}

#[derive(Debug)]
pub struct DeleteDrink;

impl RequiredPermission for DeleteDrink {
    const NAME: &'static str = "delete:drinks";
}
