//! In-process `DrinkStore`, used when no `DATABASE_URL` is configured.
//!
//! Same observable behaviour as the Postgres store: ids are assigned
//! sequentially, titles are unique, listing is ordered by id.
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::{
    drink_repo::{Drink, DrinkStore, Ingredient},
    error::RepoError,
};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    drinks: BTreeMap<i64, Drink>,
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDrinkStore {
    inner: RwLock<Inner>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list(&self) -> Result<Vec<Drink>, RepoError> {
        Ok(self.inner.read().await.drinks.values().cloned().collect())
    }

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, RepoError> {
        let mut inner = self.inner.write().await;
        if inner.title_taken(title, None) {
            return Err(RepoError::Conflict);
        }

        inner.next_id += 1;
        let drink = Drink {
            id: inner.next_id,
            title: title.to_string(),
            recipe: recipe.to_vec(),
        };
        inner.drinks.insert(drink.id, drink.clone());

        Ok(drink)
    }

    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&[Ingredient]>,
    ) -> Result<Option<Drink>, RepoError> {
        let mut inner = self.inner.write().await;
        if !inner.drinks.contains_key(&id) {
            return Ok(None);
        }
        if let Some(title) = title
            && inner.title_taken(title, Some(id))
        {
            return Err(RepoError::Conflict);
        }

        let Some(drink) = inner.drinks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            drink.title = title.to_string();
        }
        if let Some(recipe) = recipe {
            drink.recipe = recipe.to_vec();
        }

        Ok(Some(drink.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.inner.write().await.drinks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Vec<Ingredient> {
        vec![Ingredient {
            name: "water".into(),
            color: "blue".into(),
            parts: 1,
        }]
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryDrinkStore::new();
        let a = store.create("water", &water()).await.unwrap();
        let b = store.create("more water", &water()).await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn duplicate_titles_conflict() {
        let store = MemoryDrinkStore::new();
        store.create("water", &water()).await.unwrap();
        let other = store.create("tea", &water()).await.unwrap();

        assert!(matches!(
            store.create("water", &water()).await,
            Err(RepoError::Conflict)
        ));
        assert!(matches!(
            store.update(other.id, Some("water"), None).await,
            Err(RepoError::Conflict)
        ));
        // Renaming a drink to its own title is fine.
        assert!(store.update(other.id, Some("tea"), None).await.is_ok());
    }

    #[tokio::test]
    async fn update_and_delete_missing_ids() {
        let store = MemoryDrinkStore::new();
        assert_eq!(store.update(7, Some("x"), None).await.unwrap(), None);
        assert!(!store.delete(7).await.unwrap());
    }

    #[tokio::test]
    async fn missing_id_wins_over_taken_title() {
        let store = MemoryDrinkStore::new();
        store.create("water", &water()).await.unwrap();

        assert_eq!(store.update(99, Some("water"), None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_keeps_unset_fields() {
        let store = MemoryDrinkStore::new();
        let drink = store.create("water", &water()).await.unwrap();

        let updated = store.update(drink.id, Some("sparkling"), None).await.unwrap().unwrap();
        assert_eq!(updated.title, "sparkling");
        assert_eq!(updated.recipe, water());
    }
}
