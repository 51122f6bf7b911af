//! Integration tests for recipe endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;

fn errors_of(body: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(body).unwrap();
    value["errors"].as_str().unwrap_or_default().to_string()
}

/// Build a valid creation payload around one seeded ingredient and tag
fn recipe_body(name: &str, ingredient_id: i64, tag_id: i64) -> serde_json::Value {
    json!({
        "name": name,
        "text": "Mix everything together and bake for forty minutes.",
        "cooking_time": 40,
        "ingredients": [{ "id": ingredient_id, "amount": 200 }],
        "tags": [tag_id],
    })
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_recipe_full_shape() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let dinner = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let body = recipe_body("winter stew", flour, dinner);
    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", response);

    let recipe: serde_json::Value = serde_json::from_str(&response).unwrap();
    // First letter is upcased on write
    assert_eq!(recipe["name"], "Winter stew");
    assert_eq!(recipe["cooking_time"], 40);
    assert_eq!(recipe["author"]["username"], user.username.as_str());
    assert_eq!(recipe["author"]["is_subscribed"], false);
    assert_eq!(recipe["is_favorited"], false);
    assert_eq!(recipe["is_in_shopping_cart"], false);

    let ingredients = recipe["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["name"], "flour");
    assert_eq!(ingredients[0]["measurement_unit"], "g");
    assert_eq!(ingredients[0]["amount"], 200);

    let tags = recipe["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["slug"], "dinner");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_accepts_numeric_string_amount() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let sugar = app.seed_ingredient("sugar", "g").await;
    let tag = app.seed_tag("Dessert", "#F9A62B", "dessert").await;

    let mut body = recipe_body("lemon curd", sugar, tag);
    body["ingredients"][0]["amount"] = json!("150");

    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", response);

    let recipe: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(recipe["ingredients"][0]["amount"], 150);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_rejects_non_numeric_amount() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let sugar = app.seed_ingredient("sugar", "g").await;
    let tag = app.seed_tag("Dessert", "#F9A62B", "dessert").await;

    let mut body = recipe_body("bad amount", sugar, tag);
    body["ingredients"][0]["amount"] = json!("plenty");

    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        errors_of(&response),
        "The amount of ingredient can only be specified by number."
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_rejects_zero_amount() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let sugar = app.seed_ingredient("sugar", "g").await;
    let tag = app.seed_tag("Dessert", "#F9A62B", "dessert").await;

    let mut body = recipe_body("zero amount", sugar, tag);
    body["ingredients"][0]["amount"] = json!(0);

    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        errors_of(&response),
        "Specify the weight/quantity of ingredients."
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_rejects_unknown_ingredient() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let body = recipe_body("ghost ingredient", 999_999, tag);
    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors_of(&response), "No ingredient found with id=999999!");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_rejects_repeated_ingredient() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let mut body = recipe_body("twice the flour", flour, tag);
    body["ingredients"] = json!([
        { "id": flour, "amount": 100 },
        { "id": flour, "amount": 200 },
    ]);

    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors_of(&response), "The ingredients should not be repeated.");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_rejects_empty_ingredients() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let body = json!({
        "name": "air soup",
        "text": "There is nothing to cook here at all.",
        "cooking_time": 5,
        "ingredients": [],
        "tags": [tag],
    });

    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors_of(&response), "Add at least one ingredient.");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_rejects_unknown_tag() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;

    let body = recipe_body("ghost tag", flour, 999_999);
    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors_of(&response), "No tag found with id=999999!");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_rejects_short_text() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let mut body = recipe_body("short text", flour, tag);
    body["text"] = json!("too short");

    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors_of(&response), "Recipe is less than 10 characters.");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_rejects_cooking_time_bounds() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let mut body = recipe_body("instant meal", flour, tag);
    body["cooking_time"] = json!(0);
    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors_of(&response), "Minimum cooking time");

    let mut body = recipe_body("eternal roast", flour, tag);
    body["cooking_time"] = json!(241);
    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors_of(&response), "Maximum cooking time");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_name_per_author() {
    let app = common::TestApp::new().await;
    let author = app.create_test_user().await;
    let other = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let body = recipe_body("family lasagna", flour, tag);
    let (status, _) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &author.access_token)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same author, same name
    let (status, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &author.access_token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        errors_of(&response),
        "You have already saved a recipe with this name."
    );

    // A different author may reuse the name
    let (status, _) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &other.access_token)
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_list_is_public_and_newest_first() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    for name in ["first dish", "second dish", "third dish"] {
        let body = recipe_body(name, flour, tag);
        let (status, _) = app
            .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // No token needed for the feed
    let (status, response) = app
        .get(&format!("/api/v1/recipes?author={}", author_id(&app, &user).await))
        .await;

    assert_eq!(status, StatusCode::OK);

    let page: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(page["count"], 3);

    let names: Vec<&str> = page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Third dish", "Second dish", "First dish"]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_list_filters_by_tag_slug() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let breakfast = app.seed_tag("Breakfast", "#E26C2D", "breakfast").await;
    let dinner = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let mut body = recipe_body("morning porridge", flour, breakfast);
    app.post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    body = recipe_body("evening stew", flour, dinner);
    app.post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;

    let (status, response) = app.get("/api/v1/recipes?tags=breakfast").await;
    assert_eq!(status, StatusCode::OK);

    let page: serde_json::Value = serde_json::from_str(&response).unwrap();
    let results = page["results"].as_array().unwrap();
    assert!(results
        .iter()
        .all(|r| r["tags"].as_array().unwrap().iter().any(|t| t["slug"] == "breakfast")));
    assert!(results.iter().any(|r| r["name"] == "Morning porridge"));
    assert!(!results.iter().any(|r| r["name"] == "Evening stew"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_patch_merges_scalars_and_replaces_ingredients() {
    let app = common::TestApp::new().await;
    let user = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let milk = app.seed_ingredient("milk", "ml").await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let body = recipe_body("plain bread", flour, tag);
    let (_, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &user.access_token)
        .await;
    let recipe: serde_json::Value = serde_json::from_str(&response).unwrap();
    let recipe_id = recipe["id"].as_str().unwrap().to_string();

    // Only the ingredient set changes; name and text must survive
    let patch = json!({
        "ingredients": [{ "id": milk, "amount": 300 }],
        "tags": [tag],
    });
    let (status, response) = app
        .patch_auth(
            &format!("/api/v1/recipes/{}", recipe_id),
            &patch.to_string(),
            &user.access_token,
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", response);

    let updated: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(updated["name"], "Plain bread");
    assert_eq!(updated["cooking_time"], 40);

    let ingredients = updated["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["name"], "milk");
    assert_eq!(ingredients[0]["amount"], 300);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_patch_by_non_author_forbidden() {
    let app = common::TestApp::new().await;
    let author = app.create_test_user().await;
    let intruder = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let body = recipe_body("my secret pie", flour, tag);
    let (_, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &author.access_token)
        .await;
    let recipe: serde_json::Value = serde_json::from_str(&response).unwrap();
    let recipe_id = recipe["id"].as_str().unwrap().to_string();

    let patch = json!({
        "name": "stolen pie",
        "ingredients": [{ "id": flour, "amount": 1 }],
        "tags": [tag],
    });
    let (status, _) = app
        .patch_auth(
            &format!("/api/v1/recipes/{}", recipe_id),
            &patch.to_string(),
            &intruder.access_token,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_recipe() {
    let app = common::TestApp::new().await;
    let author = app.create_test_user().await;
    let intruder = app.create_test_user().await;
    let flour = app.seed_ingredient("flour", "g").await;
    let tag = app.seed_tag("Dinner", "#8775D2", "dinner").await;

    let body = recipe_body("short lived", flour, tag);
    let (_, response) = app
        .post_auth("/api/v1/recipes", &body.to_string(), &author.access_token)
        .await;
    let recipe: serde_json::Value = serde_json::from_str(&response).unwrap();
    let recipe_id = recipe["id"].as_str().unwrap().to_string();

    // Not the author
    let (status, _) = app
        .delete_auth(&format!("/api/v1/recipes/{}", recipe_id), &intruder.access_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The author
    let (status, _) = app
        .delete_auth(&format!("/api/v1/recipes/{}", recipe_id), &author.access_token)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/recipes/{}", recipe_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Resolve the caller's id through /auth/me
async fn author_id(app: &common::TestApp, user: &common::TestUser) -> String {
    let (_, response) = app.get_auth("/api/v1/auth/me", &user.access_token).await;
    let profile: serde_json::Value = serde_json::from_str(&response).unwrap();
    profile["id"].as_str().unwrap().to_string()
}
