//! Client-side state mirroring server resources.
//!
//! [`AppState`] is only changed by [`reduce`], which is called after a
//! request completes successfully. Later results overwrite earlier ones
//! (last write wins); a failed request dispatches nothing.

use chrono::{DateTime, Utc};

use crate::auth::AuthSession;
use crate::models::{
    Coupon, Expense, LoyaltyProgram, MenuCategory, MenuItem, Order, Page, Restaurant, Table,
};

/// Records addressable by their server id.
pub trait Keyed {
    fn key(&self) -> &str;
}

macro_rules! keyed_by_id {
    ($($ty:ty),* $(,)?) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &str {
                &self.id
            }
        })*
    };
}

keyed_by_id!(Order, MenuCategory, MenuItem, Expense, Table, Coupon, LoyaltyProgram);

/// The currently loaded page of one resource.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit: 20,
            loaded_at: None,
        }
    }
}

impl<T: Keyed> Collection<T> {
    fn replace_page(&mut self, page: Page<T>) {
        self.items = page.items;
        self.total = page.total;
        self.page = page.page;
        self.limit = page.limit;
        self.loaded_at = Some(Utc::now());
    }

    /// Replace the record with the same id, or prepend a new one.
    fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|i| i.key() == item.key()) {
            Some(slot) => *slot = item,
            None => {
                self.items.insert(0, item);
                self.total += 1;
            }
        }
    }

    fn remove(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|i| i.key() != id);
        if self.items.len() < before {
            self.total = self.total.saturating_sub(1);
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|i| i.key() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub session: Option<AuthSession>,
    /// Path of the page the operator is on, used for `?next=` redirects.
    pub location: String,
    pub orders: Collection<Order>,
    pub current_order: Option<Order>,
    pub menu_categories: Collection<MenuCategory>,
    pub menu_items: Collection<MenuItem>,
    pub expenses: Collection<Expense>,
    pub restaurant: Option<Restaurant>,
    pub tables: Collection<Table>,
    pub coupons: Collection<Coupon>,
    pub loyalty_programs: Collection<LoyaltyProgram>,
}

#[derive(Debug, Clone)]
pub enum Action {
    SessionStarted(AuthSession),
    SessionEnded,
    Navigated(String),

    OrdersLoaded(Page<Order>),
    OrderLoaded(Order),
    OrderSaved(Order),

    CategoriesLoaded(Page<MenuCategory>),
    CategorySaved(MenuCategory),
    CategoryRemoved(String),

    MenuItemsLoaded(Page<MenuItem>),
    MenuItemSaved(MenuItem),
    MenuItemRemoved(String),

    ExpensesLoaded(Page<Expense>),
    ExpenseSaved(Expense),
    ExpenseRemoved(String),

    RestaurantLoaded(Restaurant),

    TablesLoaded(Page<Table>),
    TableSaved(Table),
    TableRemoved(String),

    CouponsLoaded(Page<Coupon>),
    CouponSaved(Coupon),
    CouponRemoved(String),

    LoyaltyProgramsLoaded(Page<LoyaltyProgram>),
    LoyaltyProgramSaved(LoyaltyProgram),
    LoyaltyProgramRemoved(String),
}

pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SessionStarted(session) => state.session = Some(session),
        Action::SessionEnded => {
            // Nothing cached for the previous user survives a logout.
            let location = std::mem::take(&mut state.location);
            *state = AppState {
                location,
                ..AppState::default()
            };
        }
        Action::Navigated(path) => state.location = path,

        Action::OrdersLoaded(page) => state.orders.replace_page(page),
        Action::OrderLoaded(order) => state.current_order = Some(order),
        Action::OrderSaved(order) => {
            if state
                .current_order
                .as_ref()
                .is_some_and(|current| current.id == order.id)
            {
                state.current_order = Some(order.clone());
            }
            state.orders.upsert(order);
        }

        Action::CategoriesLoaded(page) => state.menu_categories.replace_page(page),
        Action::CategorySaved(category) => state.menu_categories.upsert(category),
        Action::CategoryRemoved(id) => state.menu_categories.remove(&id),

        Action::MenuItemsLoaded(page) => state.menu_items.replace_page(page),
        Action::MenuItemSaved(item) => state.menu_items.upsert(item),
        Action::MenuItemRemoved(id) => state.menu_items.remove(&id),

        Action::ExpensesLoaded(page) => state.expenses.replace_page(page),
        Action::ExpenseSaved(expense) => state.expenses.upsert(expense),
        Action::ExpenseRemoved(id) => state.expenses.remove(&id),

        Action::RestaurantLoaded(restaurant) => state.restaurant = Some(restaurant),

        Action::TablesLoaded(page) => state.tables.replace_page(page),
        Action::TableSaved(table) => state.tables.upsert(table),
        Action::TableRemoved(id) => state.tables.remove(&id),

        Action::CouponsLoaded(page) => state.coupons.replace_page(page),
        Action::CouponSaved(coupon) => state.coupons.upsert(coupon),
        Action::CouponRemoved(id) => state.coupons.remove(&id),

        Action::LoyaltyProgramsLoaded(page) => state.loyalty_programs.replace_page(page),
        Action::LoyaltyProgramSaved(program) => state.loyalty_programs.upsert(program),
        Action::LoyaltyProgramRemoved(id) => state.loyalty_programs.remove(&id),
    }
}
