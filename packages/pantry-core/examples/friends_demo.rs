//! # Friends Module Demo
//!
//! This example walks through the friends view on an in-memory store:
//! 1. Seed five profiles and a few accepted edges
//! 2. Load Sam's friends as Sam, then as Vera
//! 3. Vera sends Sam a friend request, twice
//!
//! ## Run
//!
//! ```bash
//! cargo run --example friends_demo
//! ```

use std::sync::Arc;

use pantry_core::friends::{FriendshipStatus, RequestOutcome};
use pantry_core::storage::Database;
use pantry_core::{FriendsService, FriendsView, Profile};

#[tokio::main(flavor = "current_thread")]
async fn main() -> pantry_core::Result<()> {
    println!("=================================================");
    println!("           PANTRY FRIENDS DEMO");
    println!("=================================================\n");

    // =========================================================================
    // STEP 1: Seed the graph
    // =========================================================================
    println!("1. Seeding profiles and friendships...\n");

    let db = Database::open(None).await?;
    for (id, username, name) in [
        ("sam", "sam_cooks", "Sam"),
        ("ana", "ana_bakes", "Ana"),
        ("ben", "ben", "Ben"),
        ("cho", "cho_eats", "Cho"),
        ("vera", "vera", "Vera"),
    ] {
        db.upsert_profile(&Profile::with_all(
            id,
            Some(username.to_string()),
            Some(name.to_string()),
            None,
        )?)?;
    }

    // sam - ana, ben - sam, ana - cho
    db.insert_edge("sam", "ana", FriendshipStatus::Accepted, Some("2024-04-01T09:00:00Z"))?;
    db.insert_edge("ben", "sam", FriendshipStatus::Accepted, Some("2024-05-01T09:00:00Z"))?;
    db.insert_edge("ana", "cho", FriendshipStatus::Accepted, Some("2024-05-02T09:00:00Z"))?;
    println!("   sam - ana, ben - sam, ana - cho\n");

    let service = FriendsService::new(Arc::new(db));

    // =========================================================================
    // STEP 2: Load views
    // =========================================================================
    println!("2. Sam looks at their own profile...\n");
    print_view(&service.load_view("sam", Some("sam")).await);

    println!("3. Vera looks at Sam's profile...\n");
    print_view(&service.load_view("sam", Some("vera")).await);

    // =========================================================================
    // STEP 3: Friend requests
    // =========================================================================
    println!("4. Vera sends Sam a friend request...\n");
    let first = service.send_request(Some("vera"), "sam").await;
    println!("   {}", first.message());
    if let RequestOutcome::Sent { edge } = &first {
        println!("   edge #{} is {}", edge.id, edge.status.as_str());
    }

    let again = service.send_request(Some("vera"), "sam").await;
    println!("   {}\n", again.message());

    println!("=================================================");
    println!("                 DEMO COMPLETE");
    println!("=================================================");
    Ok(())
}

fn print_view(view: &FriendsView) {
    println!("   Friends ({}):", view.direct.len());
    for friend in &view.direct {
        println!("     - {}", friend.display_label());
    }
    println!("   Friends of friends ({}):", view.friends_of_friends.len());
    for friend in &view.friends_of_friends {
        println!("     - {}", friend.display_label());
    }
    println!();
}
