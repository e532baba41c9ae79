//! If this test fails, it indicates that an IP address or other personally
//! identifiable information (PII) was logged. Ensure that sensitive values
//! checked by this test are wrapped using the `Pii` wrapper.
//! Run this test with:
//! ```shell
//! cargo test --test pii --features pii
//! ```

mod common;
#[cfg(feature = "pii")]
mod pii_log_redaction {
    use regex::Regex;
    use std::sync::Once;
    use tracing::{Event as TracingEvent, Subscriber};
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{layer::Context, Layer, Registry};

    use rtc_sdp::{Candidate, Description, Protocol, SdpError, SdpType};

    use super::common::{sdp, CHROME_OFFER};

    static INIT: Once = Once::new();

    struct AssertNoIpLayer {
        ipv4: Regex,
        ipv6: Regex,
    }

    impl<S: Subscriber> Layer<S> for AssertNoIpLayer {
        fn on_event(&self, event: &TracingEvent<'_>, _ctx: Context<'_, S>) {
            let mut visitor = StringVisitor::default();
            event.record(&mut visitor);
            let msg = visitor.0;
            if self.ipv4.is_match(&msg) {
                panic!("IPv4 address found in log: {}", msg);
            }
            if self.ipv6.is_match(&msg) {
                panic!("IPv6 address found in log: {}", msg);
            }
        }
    }

    #[derive(Default)]
    struct StringVisitor(String);
    impl tracing::field::Visit for StringVisitor {
        fn record_debug(&mut self, _field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            use std::fmt::Write;
            let _ = write!(&mut self.0, "{:?}", value);
        }
        fn record_str(&mut self, _field: &tracing::field::Field, value: &str) {
            self.0.push_str(value);
        }
    }

    fn install_assert_no_ip_layer() {
        INIT.call_once(|| {
            let ipv4 = Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").unwrap();
            let ipv6 = Regex::new(r"\b([0-9a-fA-F]{1,4}:){2,7}[0-9a-fA-F]{1,4}\b").unwrap();
            let layer = AssertNoIpLayer { ipv4, ipv6 }
                .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);
            let subscriber = Registry::default().with(layer);
            tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
        });
    }

    #[test]
    fn pii_test() -> Result<(), SdpError> {
        install_assert_no_ip_layer();

        // Parsing logs candidates and credentials.
        let offer = Description::parse(&sdp(CHROME_OFFER), SdpType::Offer)?;

        let mut answer = Description::new(SdpType::Answer);
        answer.add_media(&offer)?;

        for addr in ["192.168.1.3:5000", "[2001:db8::1]:5000"] {
            let c = Candidate::host(addr.parse().unwrap(), Protocol::Udp)?;
            answer.add_candidate(c);
        }
        let relayed = Candidate::relayed(
            "203.0.113.7:3478".parse().unwrap(),
            "198.51.100.2:41000".parse().unwrap(),
            Protocol::Udp,
        )?;
        answer.add_candidate(relayed);

        // A candidate we can't use is an error naming the address.
        let bad = Candidate::host("0.0.0.0:9".parse().unwrap(), Protocol::Udp);
        assert!(matches!(bad, Err(SdpError::BadCandidate(_))));

        answer.end_candidates();
        let _ = answer.to_string();
        let _ = answer.extract_candidates();

        Ok(())
    }
}
