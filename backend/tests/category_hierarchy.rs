//! Category tree behaviour over the real store.

use std::sync::Arc;

use rust_decimal::Decimal;

use backend::domain::ports::{
    CategoryCommand, CategoryQuery, CreateCategoryRequest, CreateProductRequest, ProductCommand,
};
use backend::domain::{CategoryId, CategoryService, ErrorCode, ProductService};
use backend::outbound::persistence::MemoryStore;

fn services(
    store: &MemoryStore,
) -> (
    CategoryService<MemoryStore, MemoryStore>,
    ProductService<MemoryStore, MemoryStore>,
) {
    let store = Arc::new(store.clone());
    (
        CategoryService::new(Arc::clone(&store), Arc::clone(&store)),
        ProductService::new(Arc::clone(&store), store),
    )
}

fn category_request(name: &str, slug: &str, parent: Option<CategoryId>) -> CreateCategoryRequest {
    CreateCategoryRequest {
        name: name.to_owned(),
        description: None,
        slug: slug.to_owned(),
        parent_id: parent,
    }
}

#[tokio::test]
async fn descendants_cover_a_deep_chain_without_duplicates() {
    let store = MemoryStore::new();
    let (categories, _) = services(&store);

    let root = categories
        .create(category_request("Level 0", "level-0", None))
        .await
        .expect("root created");
    let mut parent = root.id;
    for depth in 1..150 {
        let child = categories
            .create(category_request(
                &format!("Level {depth}"),
                &format!("level-{depth}"),
                Some(parent),
            ))
            .await
            .expect("child created");
        parent = child.id;
    }

    let subtree = categories.descendants(&root.id).await.expect("traversal");
    assert_eq!(subtree.len(), 150);
    assert_eq!(subtree[0].id, root.id, "root comes first");

    let unique: std::collections::HashSet<_> = subtree.iter().map(|c| c.id).collect();
    assert_eq!(unique.len(), subtree.len(), "no category appears twice");
}

#[tokio::test]
async fn reparent_to_descendant_is_rejected_and_tree_unchanged() {
    let store = MemoryStore::new();
    let (categories, _) = services(&store);

    let root = categories
        .create(category_request("Electronics", "electronics", None))
        .await
        .expect("root");
    let child = categories
        .create(category_request("Laptops", "laptops", Some(root.id)))
        .await
        .expect("child");
    let grandchild = categories
        .create(category_request("Gaming", "gaming", Some(child.id)))
        .await
        .expect("grandchild");

    let err = categories
        .set_parent(&root.id, Some(grandchild.id))
        .await
        .expect_err("cycle");
    assert_eq!(err.code(), ErrorCode::CycleDetected);

    let after = categories.get(&root.id).await.expect("root still present");
    assert!(after.parent.is_none(), "rejected move left the root alone");
    let subtree = categories.descendants(&root.id).await.expect("traversal");
    assert_eq!(subtree.len(), 3);
}

#[tokio::test]
async fn tree_nests_children_under_parents() {
    let store = MemoryStore::new();
    let (categories, _) = services(&store);

    let root = categories
        .create(category_request("Electronics", "electronics", None))
        .await
        .expect("root");
    categories
        .create(category_request("Laptops", "laptops", Some(root.id)))
        .await
        .expect("child");
    categories
        .create(category_request("Books", "books", None))
        .await
        .expect("second root");

    let forest = categories.tree().await.expect("forest");
    assert_eq!(forest.len(), 2);
    // Roots sort by name: Books before Electronics.
    assert_eq!(forest[0].category.name, "Books");
    assert_eq!(forest[1].category.name, "Electronics");
    assert_eq!(forest[1].children.len(), 1);
    assert_eq!(forest[1].children[0].category.name, "Laptops");
}

#[tokio::test]
async fn average_price_spans_the_subtree() {
    let store = MemoryStore::new();
    let (categories, products) = services(&store);

    let electronics = categories
        .create(category_request("Electronics", "electronics", None))
        .await
        .expect("root");
    let laptops = categories
        .create(category_request("Laptops", "laptops", Some(electronics.id)))
        .await
        .expect("child");

    for (name, sku, price) in [
        ("Basic laptop", "LAP-001", Decimal::new(100_000, 2)),
        ("Fancy laptop", "LAP-002", Decimal::new(200_000, 2)),
    ] {
        products
            .create(CreateProductRequest {
                name: name.to_owned(),
                description: None,
                price,
                sku: sku.to_owned(),
                category_id: laptops.id,
                stock_quantity: 1,
            })
            .await
            .expect("product created");
    }

    let stats = categories
        .average_price(&electronics.id)
        .await
        .expect("aggregates");
    assert_eq!(stats.average, Decimal::new(150_000, 2));
    assert_eq!(stats.count, 2);
    assert_eq!(stats.total_value, Decimal::new(300_000, 2));
}

#[tokio::test]
async fn average_price_of_empty_subtree_is_all_zeros() {
    let store = MemoryStore::new();
    let (categories, _) = services(&store);

    let empty = categories
        .create(category_request("Empty", "empty", None))
        .await
        .expect("category");
    let stats = categories.average_price(&empty.id).await.expect("aggregates");
    assert_eq!(stats.average, Decimal::ZERO);
    assert_eq!(stats.count, 0);
    assert_eq!(stats.total_value, Decimal::ZERO);
}

#[tokio::test]
async fn delete_refuses_category_with_children_or_products() {
    let store = MemoryStore::new();
    let (categories, products) = services(&store);

    let root = categories
        .create(category_request("Electronics", "electronics", None))
        .await
        .expect("root");
    let child = categories
        .create(category_request("Laptops", "laptops", Some(root.id)))
        .await
        .expect("child");

    let err = categories.delete(&root.id).await.expect_err("has a child");
    assert_eq!(err.code(), ErrorCode::Conflict);

    products
        .create(CreateProductRequest {
            name: "Laptop".to_owned(),
            description: None,
            price: Decimal::new(100_000, 2),
            sku: "LAP-001".to_owned(),
            category_id: child.id,
            stock_quantity: 1,
        })
        .await
        .expect("product created");
    let err = categories.delete(&child.id).await.expect_err("has a product");
    assert_eq!(err.code(), ErrorCode::Conflict);
}
