#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::branding_context::*;
    use super::super::branding_lookup::BrandingLookupService;
    use super::super::color::hex_to_hsl;
    use super::super::css::{PRIMARY, SIDEBAR_PRIMARY};
    use super::super::test_support::{ScriptedLookup, UnavailableAuth, primary};
    use crate::infra::auth::{EVENT_CAPACITY, StaticAuthClient};
    use crate::infra::css_sink::RootStyleSheet;
    use branding_sdk::{AuthEvent, BrandingRecord, BrandingSettings, LookupError};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    /// Lets spawned tasks run without advancing past any scripted delay.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn lookup_service(lookup: &Arc<ScriptedLookup>) -> Arc<BrandingLookupService> {
        Arc::new(BrandingLookupService::new(
            lookup.clone(),
            BrandingSettings::platform_default(),
        ))
    }

    fn mount(auth: &Arc<StaticAuthClient>, lookup: &Arc<ScriptedLookup>) -> BrandingContext {
        BrandingContext::mount(auth.clone(), lookup_service(lookup))
    }

    /// Reports whether `loading` was raised before the context next settles.
    fn observe_loading(ctx: &BrandingContext) -> tokio::task::JoinHandle<bool> {
        let mut rx = ctx.subscribe();
        tokio::spawn(async move {
            let mut raised = false;
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                raised |= state.loading;
                if state.phase == BrandingPhase::Ready {
                    break;
                }
            }
            raised
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_loads_tenant_branding() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::from_millis(200), Ok(primary("#2563eb")));

        let ctx = mount(&auth, &lookup);
        settle().await;
        let loading = ctx.state();
        assert!(loading.loading);
        assert_eq!(loading.phase, BrandingPhase::Loading);
        assert_eq!(loading.branding, None);

        let ready = ctx.wait_until_ready().await.unwrap();
        assert!(!ready.loading);
        let branding = ready.branding.unwrap();
        assert_eq!(branding.primary_color, "#2563eb");
        assert_eq!(branding.secondary_color, "#ea580c");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_session_resolves_to_defaults_without_lookup() {
        let auth = Arc::new(StaticAuthClient::anonymous());
        let lookup = Arc::new(ScriptedLookup::default());

        let ctx = mount(&auth, &lookup);
        let ready = ctx.wait_until_ready().await.unwrap();

        assert_eq!(ready.branding, Some(BrandingSettings::platform_default()));
        assert_eq!(lookup.email_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_without_tenant_record_gets_platform_colors() {
        let auth = Arc::new(StaticAuthClient::signed_in("stranger@elsewhere.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(BrandingRecord::default()));

        let ctx = mount(&auth, &lookup);
        let branding = ctx.wait_until_ready().await.unwrap().branding.unwrap();

        assert_eq!(branding.primary_color, "#f97316");
        assert_eq!(branding.secondary_color, "#ea580c");
        assert_eq!(branding.logo_url, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_failure_resolves_to_defaults() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(
            Duration::ZERO,
            Err(LookupError::Transport("reset".to_owned())),
        );

        let ctx = mount(&auth, &lookup);
        let ready = ctx.wait_until_ready().await.unwrap();

        assert!(!ready.loading);
        assert_eq!(ready.branding, Some(BrandingSettings::platform_default()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_timeout_resolves_to_defaults() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::from_secs(60), Ok(primary("#2563eb")));

        let ctx = mount(&auth, &lookup);
        let ready = ctx.wait_until_ready().await.unwrap();

        assert_eq!(ready.branding, Some(BrandingSettings::platform_default()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_session_resolves_to_defaults() {
        let lookup = Arc::new(ScriptedLookup::default());
        let auth = Arc::new(UnavailableAuth::default());
        let ctx = BrandingContext::mount(auth, lookup_service(&lookup));

        let ready = ctx.wait_until_ready().await.unwrap();

        assert_eq!(ready.branding, Some(BrandingSettings::platform_default()));
        assert_eq!(lookup.email_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_refresh_never_raises_loading() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(primary("#2563eb")));
        lookup.push_email(Duration::from_millis(500), Ok(primary("#16a34a")));

        let ctx = mount(&auth, &lookup);
        ctx.wait_until_ready().await.unwrap();
        let mut rx = ctx.subscribe();

        auth.emit(AuthEvent::TokenRefreshed);
        settle().await;

        let refreshing = ctx.state();
        assert_eq!(refreshing.phase, BrandingPhase::Refreshing);
        assert!(!refreshing.loading);
        assert_eq!(refreshing.branding.unwrap().primary_color, "#2563eb");

        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            assert!(!state.loading, "loading raised during token refresh");
            if state.phase == BrandingPhase::Ready {
                break;
            }
        }
        assert_eq!(ctx.branding().unwrap().primary_color, "#16a34a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_refresh_does_not_replace_branding() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(primary("#2563eb")));
        lookup.push_email(Duration::ZERO, Ok(primary("#2563eb")));

        let ctx = mount(&auth, &lookup);
        let before = ctx.wait_until_ready().await.unwrap();

        auth.emit(AuthEvent::TokenRefreshed);
        settle().await;

        assert_eq!(lookup.email_calls.load(Ordering::SeqCst), 2);
        assert_eq!(ctx.state(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_in_shows_loading() {
        let auth = Arc::new(StaticAuthClient::anonymous());
        let lookup = Arc::new(ScriptedLookup::default());
        let ctx = mount(&auth, &lookup);
        ctx.wait_until_ready().await.unwrap();

        lookup.push_email(Duration::from_millis(300), Ok(primary("#7c3aed")));
        auth.set_session(Some(branding_sdk::AuthSession::with_email("owner@acme.test")));
        auth.emit(AuthEvent::SignedIn);
        settle().await;

        let state = ctx.state();
        assert!(state.loading);
        assert_eq!(state.phase, BrandingPhase::Loading);

        let ready = ctx.wait_until_ready().await.unwrap();
        assert!(!ready.loading);
        assert_eq!(ready.branding.unwrap().primary_color, "#7c3aed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_out_falls_back_to_defaults_in_background() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(primary("#2563eb")));
        let ctx = mount(&auth, &lookup);
        ctx.wait_until_ready().await.unwrap();

        auth.set_session(None);
        auth.emit(AuthEvent::SignedOut);
        settle().await;

        let state = ctx.state();
        assert!(!state.loading);
        assert_eq!(state.branding, Some(BrandingSettings::platform_default()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_issued_fetch_wins() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        // Mount fetch is slow and stale; the refetch issued after it is fast.
        lookup.push_email(Duration::from_secs(5), Ok(primary("#111111")));
        lookup.push_email(Duration::from_secs(1), Ok(primary("#222222")));

        let ctx = mount(&auth, &lookup);
        settle().await;
        ctx.refetch();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(ctx.branding().unwrap().primary_color, "#222222");
        assert!(!ctx.is_loading());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(
            ctx.branding().unwrap().primary_color,
            "#222222",
            "stale mount fetch overwrote fresher data"
        );
        assert_eq!(lookup.email_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_fetch_wins_even_when_it_resolves_last() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(primary("#000001")));
        lookup.push_email(Duration::from_millis(100), Ok(primary("#000002")));
        lookup.push_email(Duration::from_millis(900), Ok(primary("#000003")));

        let ctx = mount(&auth, &lookup);
        ctx.wait_until_ready().await.unwrap();
        ctx.refetch();
        settle().await;
        ctx.refetch();

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(ctx.branding().unwrap().primary_color, "#000003");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_with_loading_raises_loading() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(primary("#2563eb")));
        lookup.push_email(Duration::from_millis(200), Ok(primary("#0891b2")));
        let ctx = mount(&auth, &lookup);
        ctx.wait_until_ready().await.unwrap();

        ctx.refetch_with_loading();
        assert!(ctx.is_loading());

        let ready = ctx.wait_until_ready().await.unwrap();
        assert_eq!(ready.branding.unwrap().primary_color, "#0891b2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_state_updates_after_dispose() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::from_secs(1), Ok(primary("#2563eb")));

        let ctx = mount(&auth, &lookup);
        let rx = ctx.subscribe();
        settle().await;
        ctx.dispose();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(
            auth.emit(AuthEvent::TokenRefreshed),
            0,
            "listener must unsubscribe"
        );

        assert_eq!(rx.borrow().branding, None);
        assert_eq!(ctx.wait_until_ready().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_unsubscribes_from_auth_events() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());

        let ctx = mount(&auth, &lookup);
        ctx.wait_until_ready().await.unwrap();
        assert_eq!(auth.emit(AuthEvent::UserUpdated), 1);

        drop(ctx);
        settle().await;

        assert_eq!(auth.emit(AuthEvent::TokenRefreshed), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagged_auth_events_trigger_one_background_refresh() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(primary("#2563eb")));
        lookup.push_email(Duration::ZERO, Ok(primary("#16a34a")));
        let ctx = mount(&auth, &lookup);
        ctx.wait_until_ready().await.unwrap();
        let observer = observe_loading(&ctx);

        // Published before the listener gets to run, so it falls behind.
        for _ in 0..EVENT_CAPACITY + 4 {
            assert_eq!(auth.emit(AuthEvent::TokenRefreshed), 1);
        }
        settle().await;
        settle().await;

        assert!(
            !observer.await.unwrap(),
            "loading raised by a lagged refresh"
        );
        assert_eq!(lookup.email_calls.load(Ordering::SeqCst), 2);
        assert_eq!(ctx.branding().unwrap().primary_color, "#16a34a");
        assert!(!ctx.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_updated_refreshes_in_background() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(primary("#2563eb")));
        lookup.push_email(Duration::from_millis(100), Ok(primary("#9333ea")));
        let ctx = mount(&auth, &lookup);
        ctx.wait_until_ready().await.unwrap();
        let observer = observe_loading(&ctx);

        auth.set_session(Some(branding_sdk::AuthSession::with_email("new@acme.test")));
        auth.emit(AuthEvent::UserUpdated);

        assert!(
            !observer.await.unwrap(),
            "loading raised by a profile update"
        );
        assert_eq!(lookup.email_calls.load(Ordering::SeqCst), 2);
        assert_eq!(ctx.branding().unwrap().primary_color, "#9333ea");
    }

    #[tokio::test(start_paused = true)]
    async fn test_projected_styles_follow_token_refresh() {
        let auth = Arc::new(StaticAuthClient::signed_in("owner@acme.test"));
        let lookup = Arc::new(ScriptedLookup::default());
        lookup.push_email(Duration::ZERO, Ok(primary("#2563eb")));
        lookup.push_email(Duration::ZERO, Ok(primary("#0f766e")));
        let sheet = Arc::new(RootStyleSheet::default());

        let ctx = mount(&auth, &lookup);
        ctx.project_styles(sheet.clone());
        ctx.wait_until_ready().await.unwrap();
        settle().await;
        assert_eq!(sheet.get(PRIMARY), Some(hex_to_hsl("#2563eb")));

        auth.emit(AuthEvent::TokenRefreshed);
        settle().await;

        assert_eq!(sheet.get(PRIMARY).as_deref(), Some("175 77% 26%"));
        assert_eq!(sheet.get(SIDEBAR_PRIMARY).as_deref(), Some("175 77% 26%"));

        ctx.dispose();
        settle().await;
        assert!(sheet.is_empty(), "styles must be removed on dispose");
    }
}
