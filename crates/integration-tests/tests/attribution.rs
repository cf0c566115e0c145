//! End-to-end affiliate attribution through the services.
//!
//! Each visitor gets its own persistent and per-visit storage; the document
//! store is shared.

use moda_brasil_core::{
    CommissionStatus, Email, Money, ProductId, ReferralLocation, UserId, UserRole,
};
use moda_brasil_storefront::db::{
    ClickRepository, CommissionRepository, OrderRepository, ProductRepository, UserRepository,
};
use moda_brasil_storefront::models::{CurrentUser, NewProfile, Product, UserProfile};
use moda_brasil_storefront::services::{
    AffiliateStatsService, CheckoutItem, CheckoutRequest, OrderService, ProfileService,
    ReferralCapture,
};
use moda_brasil_storefront::storage::{ClientStorage, MemoryStorage, keys};
use moda_brasil_storefront::store::MemoryStore;
use rust_decimal::Decimal;

struct Visitor {
    persistent: MemoryStorage,
    visit: MemoryStorage,
}

impl Visitor {
    fn new() -> Self {
        Self {
            persistent: MemoryStorage::new(),
            visit: MemoryStorage::new(),
        }
    }

    /// Close the browser tab: per-visit storage is gone, persistent stays.
    fn new_visit(self) -> Self {
        Self {
            persistent: self.persistent,
            visit: MemoryStorage::new(),
        }
    }
}

async fn visit(store: &MemoryStore, visitor: &Visitor, url: &str) -> bool {
    ReferralCapture::new(store)
        .capture(
            &ReferralLocation::from_url(url),
            "Mozilla/5.0",
            &visitor.persistent,
            &visitor.visit,
        )
        .await
        .click_recorded
}

async fn sign_up(store: &MemoryStore, visitor: &Visitor, uid: &str, name: &str) -> UserProfile {
    ProfileService::new(store)
        .create_profile(
            NewProfile {
                uid: UserId::new(uid),
                name: name.to_string(),
                email: Email::parse(&format!("{uid}@exemplo.com")).unwrap(),
                role: UserRole::Customer,
            },
            &visitor.persistent,
        )
        .await
        .unwrap()
}

async fn add_product(store: &MemoryStore, centavos: i64) -> ProductId {
    ProductRepository::new(store)
        .add(&Product {
            id: None,
            name: "Vestido Floral".to_string(),
            description: String::new(),
            base_price: Money::from_centavos(centavos),
            sizes: vec!["M".to_string()],
            colors: vec!["Azul".to_string()],
            stock: 10,
            images: Vec::new(),
        })
        .await
        .unwrap()
}

fn checkout(product_id: &ProductId, quantity: u32) -> CheckoutRequest {
    CheckoutRequest {
        items: vec![CheckoutItem {
            product_id: product_id.clone(),
            selected_size: "M".to_string(),
            selected_color: "Azul".to_string(),
            quantity,
        }],
        payment_method: moda_brasil_core::PaymentMethod::Pix,
        seller_id: None,
    }
}

fn signed_in(profile: &UserProfile) -> CurrentUser {
    CurrentUser {
        uid: profile.uid.clone(),
        email: profile.email.clone(),
        profile: Some(profile.clone()),
    }
}

#[tokio::test]
async fn test_referred_purchase_earns_pending_commission() {
    let store = MemoryStore::new();

    // A signs up without a referral
    let ana_browser = Visitor::new();
    visit(&store, &ana_browser, "https://modabrasil.com.br/").await;
    let ana = sign_up(&store, &ana_browser, "ana", "Ana Souza").await;
    assert!(ana.referred_by.is_none());
    let code = ana.affiliate_code.clone().unwrap();
    assert!(code.as_str().starts_with("ANA"));
    assert_eq!(code.as_str().len(), 7);

    // B arrives through A's link and signs up
    let bruno_browser = Visitor::new();
    let link = format!("https://modabrasil.com.br/?ref={}", code.as_str());
    assert!(visit(&store, &bruno_browser, &link).await);
    let bruno = sign_up(&store, &bruno_browser, "bruno", "Bruno Lima").await;
    assert_eq!(bruno.referred_by, Some(ana.uid.clone()));
    assert_eq!(
        bruno_browser.persistent.get(keys::PENDING_REFERRAL).await.unwrap(),
        None
    );

    // B orders 200.00
    let product = add_product(&store, 10_000).await;
    let order_id = OrderService::new(&store)
        .checkout(
            &signed_in(&bruno),
            checkout(&product, 2),
            Decimal::from(10),
            &bruno_browser.persistent,
        )
        .await
        .unwrap();

    let order = OrderRepository::new(&store).get(&order_id).await.unwrap().unwrap();
    assert_eq!(order.total_amount, Money::from_centavos(20_000));
    assert_eq!(order.affiliate_id, Some(ana.uid.clone()));
    assert_eq!(order.affiliate_commission, Some(Money::from_centavos(1_000)));

    let commissions = CommissionRepository::new(&store)
        .list_by_affiliate(&ana.uid)
        .await
        .unwrap();
    assert_eq!(commissions.len(), 1);
    assert_eq!(commissions[0].amount, Money::from_centavos(1_000));
    assert_eq!(commissions[0].status, CommissionStatus::Pending);
    assert_eq!(commissions[0].order_id, order_id);
    assert_eq!(commissions[0].from_user_name, "Bruno Lima");

    // A's dashboard
    let stats = AffiliateStatsService::new(&store).stats(&ana.uid).await.unwrap();
    assert_eq!(stats.clicks, 1);
    assert_eq!(stats.referrals, 1);
    assert_eq!(stats.referred_users[0].uid, bruno.uid);
    assert_eq!(stats.pending_balance, Money::from_centavos(1_000));
    assert_eq!(stats.total_earned, Money::ZERO);
}

#[tokio::test]
async fn test_unreferred_purchase_has_no_commission() {
    let store = MemoryStore::new();
    let browser = Visitor::new();
    let carla = sign_up(&store, &browser, "carla", "Carla").await;
    let product = add_product(&store, 5_000).await;

    let order_id = OrderService::new(&store)
        .checkout(
            &signed_in(&carla),
            checkout(&product, 1),
            Decimal::from(10),
            &browser.persistent,
        )
        .await
        .unwrap();

    let order = OrderRepository::new(&store).get(&order_id).await.unwrap().unwrap();
    assert!(order.affiliate_id.is_none());
    assert!(order.affiliate_commission.is_none());

    let ledger = CommissionRepository::new(&store)
        .list_by_affiliate(&carla.uid)
        .await
        .unwrap();
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn test_clicks_are_recorded_once_per_visit() {
    let store = MemoryStore::new();
    let ana = sign_up(&store, &Visitor::new(), "ana", "Ana").await;
    let link = format!(
        "https://modabrasil.com.br/produto/1?ref={}",
        ana.affiliate_code.as_ref().unwrap().as_str()
    );

    let mut visitor = Visitor::new();
    assert!(visit(&store, &visitor, &link).await);
    assert!(!visit(&store, &visitor, &link).await);

    visitor = visitor.new_visit();
    assert!(visit(&store, &visitor, &link).await);

    let clicks = ClickRepository::new(&store)
        .list_by_affiliate(&ana.uid)
        .await
        .unwrap();
    assert_eq!(clicks.len(), 2);
    assert!(clicks.iter().all(|c| c.origin == "/produto/1"));
}

#[tokio::test]
async fn test_self_referral_is_ignored() {
    let store = MemoryStore::new();
    let browser = Visitor::new();
    let ana = sign_up(&store, &browser, "ana", "Ana").await;

    // Ana follows her own link, then her profile is re-created for the same uid
    let link = format!(
        "https://modabrasil.com.br/?ref={}",
        ana.affiliate_code.as_ref().unwrap().as_str()
    );
    visit(&store, &browser, &link).await;
    let recreated = sign_up(&store, &browser, "ana", "Ana").await;

    assert!(recreated.referred_by.is_none());
    // Nothing was attributed, so the pending code stays
    assert!(
        browser
            .persistent
            .get(keys::PENDING_REFERRAL)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_unknown_code_leaves_profile_unreferred() {
    let store = MemoryStore::new();
    let browser = Visitor::new();
    let recorded = visit(&store, &browser, "https://modabrasil.com.br/?ref=NINGUEM1").await;
    assert!(!recorded);

    let dani = sign_up(&store, &browser, "dani", "Dani").await;
    assert!(dani.referred_by.is_none());
    assert!(
        UserRepository::new(&store)
            .list_by_referrer(&UserId::new("dani"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_legacy_seller_link_credits_partner_once() {
    let store = MemoryStore::new();
    let mut loja = sign_up(&store, &Visitor::new(), "loja", "Loja da Carla").await;
    loja.role = UserRole::Seller;
    UserRepository::new(&store).put(&loja).await.unwrap();

    let browser = Visitor::new();
    visit(&store, &browser, "https://modabrasil.com.br/produto/1?seller=loja").await;
    let cliente = sign_up(&store, &browser, "cliente", "Cliente").await;
    let product = add_product(&store, 10_000).await;

    let service = OrderService::new(&store);
    let customer = signed_in(&cliente);
    let mut placed = Vec::new();
    for _ in 0..2 {
        let id = service
            .checkout(
                &customer,
                checkout(&product, 1),
                Decimal::from(10),
                &browser.persistent,
            )
            .await
            .unwrap();
        placed.push(id);
    }
    let [first, second] = <[_; 2]>::try_from(placed).unwrap();

    let orders = OrderRepository::new(&store);
    let first = orders.get(&first).await.unwrap().unwrap();
    let second = orders.get(&second).await.unwrap().unwrap();
    assert_eq!(first.seller_id, Some(loja.uid.clone()));
    assert_eq!(first.commission_amount, Money::from_centavos(1_000));
    assert!(second.seller_id.is_none());
    assert_eq!(second.commission_amount, Money::ZERO);
}
