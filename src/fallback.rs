//! Static recommendations served when the live pipeline fails.

use crate::models::{Bottle, Recommendation};

/// The fixed fallback list, in order.
pub fn fallback_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            bottle: Bottle {
                id: 158,
                name: "Weller Antique 107".to_string(),
                size: 750.0,
                proof: None,
                abv: Some(53.5),
                spirit_type: "Bourbon".to_string(),
                brand_id: Some(156),
                popularity: Some(100266.0),
                image_url: "https://d1w35me0y6a2bb.cloudfront.net/newproducts/rec8X36afthvgqzO9"
                    .to_string(),
                avg_msrp: Some(56.35),
                fair_price: 116.66,
                shelf_price: 109.89,
                total_score: 40001,
                wishlist_count: 8098,
                vote_count: 13989,
                bar_count: 17914,
                ranking: 5,
            },
            reason: "Based on similar price range, same spirit type (Bourbon)".to_string(),
        },
        Recommendation {
            bottle: Bottle {
                id: 2803,
                name: "Weller Special Reserve".to_string(),
                size: 750.0,
                proof: None,
                abv: Some(45.0),
                spirit_type: "Bourbon".to_string(),
                brand_id: Some(156),
                popularity: Some(100328.0),
                image_url: "https://d1w35me0y6a2bb.cloudfront.net/newproducts/rec3BbLSm2nodYUyX"
                    .to_string(),
                avg_msrp: Some(29.49),
                fair_price: 58.63,
                shelf_price: 64.99,
                total_score: 39429,
                wishlist_count: 3810,
                vote_count: 9769,
                bar_count: 25850,
                ranking: 6,
            },
            reason: "Based on same brand, same spirit type (Bourbon)".to_string(),
        },
    ]
}
