//! Scanner module - resolves hosts and probes them for SSH host keys.
//!
//! [`KeyScanner`] ties the pieces together: per host it settles the port
//! (explicit, or from `ssh -G`), resolves addresses under the family
//! policy, and runs `ssh-keyscan` once per address.
//!
//! Error policy: a missing or failing configuration lookup aborts the whole
//! scan, while DNS failures and probe failures only affect the host or
//! address concerned.

pub mod keyscan;
pub mod outcome;
pub mod rate_limiter;
pub mod report;

use crate::config::ToolPaths;
use crate::error::{ProbeError, ScanError, ScanResult};
use crate::exec::{CommandRunner, SystemRunner};
use crate::resolver::{resolve_hostname, DnsLookup, NameLookup};
use crate::ssh_config::{get_effective_config, ConfigSource, EffectiveConfig};
use crate::types::{AddressFamilyPolicy, Port, ResolvedAddress};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use keyscan::{probe_invocation, run_probe, ProbeOptions, ProbeOutput, MAX_PARAMETERS};
pub use outcome::{HostKey, ProbeOutcome, ProbeStatus};
pub use rate_limiter::RateLimiter;
pub use report::ScanReport;

/// Options for a scan run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// SSH config file consulted for ports.
    pub config_source: ConfigSource,
    /// Login user passed to `ssh -G`, which can change `Match user` results.
    pub user: Option<String>,
    /// Address families to resolve.
    pub policy: AddressFamilyPolicy,
    /// Port for every host; skips the configuration lookup when set.
    pub port: Option<Port>,
    /// Hosts processed at once. 1 is strictly sequential.
    pub concurrency: usize,
    /// Wall-clock limit for each `ssh-keyscan` run.
    pub probe_timeout: Option<Duration>,
    /// Wall-clock limit for each `ssh -G` run.
    pub config_timeout: Option<Duration>,
    /// `ssh-keyscan -T` value in seconds.
    pub connect_timeout_secs: Option<u32>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config_source: ConfigSource::Default,
            user: None,
            policy: AddressFamilyPolicy::Both,
            port: None,
            concurrency: 1,
            probe_timeout: Some(Duration::from_secs(30)),
            config_timeout: Some(Duration::from_secs(10)),
            connect_timeout_secs: None,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_source(mut self, source: ConfigSource) -> Self {
        self.config_source = source;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_policy(mut self, policy: AddressFamilyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the number of hosts scanned in parallel (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_probe_timeout(mut self, limit: Option<Duration>) -> Self {
        self.probe_timeout = limit;
        self
    }

    pub fn with_config_timeout(mut self, limit: Option<Duration>) -> Self {
        self.config_timeout = limit;
        self
    }

    pub fn with_connect_timeout(mut self, secs: Option<u32>) -> Self {
        self.connect_timeout_secs = secs;
        self
    }
}

/// Resolves hosts and probes them for host keys.
pub struct KeyScanner {
    runner: Arc<dyn CommandRunner>,
    lookup: Arc<dyn NameLookup>,
    tools: ToolPaths,
    limiter: Option<RateLimiter>,
}

impl KeyScanner {
    /// Create a scanner from explicit collaborators.
    pub fn new(runner: Arc<dyn CommandRunner>, lookup: Arc<dyn NameLookup>, tools: ToolPaths) -> Self {
        Self {
            runner,
            lookup,
            tools,
            limiter: None,
        }
    }

    /// A scanner that spawns real processes and uses the system resolver.
    pub fn system(tools: ToolPaths) -> Self {
        Self::new(
            Arc::new(SystemRunner::new()),
            Arc::new(DnsLookup::from_system_conf()),
            tools,
        )
    }

    /// Limit probe launches per second; 0 removes the limit.
    pub fn with_rate_limit(mut self, rate: u32) -> Self {
        self.limiter = RateLimiter::per_second(rate);
        self
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Effective SSH configuration for `host`.
    pub async fn effective_config(
        &self,
        host: &str,
        user: Option<&str>,
        source: &ConfigSource,
        limit: Option<Duration>,
    ) -> ScanResult<EffectiveConfig> {
        get_effective_config(self.runner.as_ref(), &self.tools.ssh, host, user, source, limit).await
    }

    /// Resolve `host` under `policy`.
    pub async fn resolve(&self, host: &str, policy: AddressFamilyPolicy) -> Vec<ResolvedAddress> {
        resolve_hostname(self.lookup.as_ref(), host, policy).await
    }

    /// Run one `ssh-keyscan` over `targets`, honouring the rate limit.
    pub async fn probe<S: AsRef<str>>(
        &self,
        targets: &[S],
        opts: &ProbeOptions,
    ) -> Result<ProbeOutput, ProbeError> {
        if let Some(limiter) = &self.limiter {
            limiter.wait().await;
        }
        run_probe(self.runner.as_ref(), &self.tools.ssh_keyscan, targets, opts).await
    }

    /// Port to use for `host`: the explicit one, else the configured one.
    pub async fn resolve_port(&self, host: &str, opts: &ScanOptions) -> ScanResult<Port> {
        if let Some(port) = opts.port {
            return Ok(port);
        }

        let config = self
            .effective_config(host, opts.user.as_deref(), &opts.config_source, opts.config_timeout)
            .await?;

        config.port().ok_or_else(|| ScanError::MissingPort {
            host: host.to_string(),
            value: config.get("port").map(str::to_string),
        })
    }

    /// Scan `hosts` and return one outcome per probed address.
    ///
    /// Outcomes follow input host order, then resolution order. Hosts that
    /// resolve to nothing under the policy contribute no outcomes. The
    /// first configuration error (in host order) aborts the scan.
    pub async fn scan<T: AsRef<str>>(
        &self,
        hosts: &[T],
        opts: &ScanOptions,
    ) -> ScanResult<Vec<ProbeOutcome>> {
        let per_host: Vec<Vec<ProbeOutcome>> = stream::iter(hosts)
            .map(|host| self.scan_host(host.as_ref(), opts))
            .buffered(opts.concurrency.max(1))
            .try_collect()
            .await?;

        Ok(per_host.into_iter().flatten().collect())
    }

    async fn scan_host(&self, host: &str, opts: &ScanOptions) -> ScanResult<Vec<ProbeOutcome>> {
        let port = self.resolve_port(host, opts).await?;

        let addresses = self.resolve(host, opts.policy).await;
        if addresses.is_empty() {
            info!(host, policy = %opts.policy, "no addresses, skipping");
            return Ok(Vec::new());
        }

        let probe_opts = ProbeOptions {
            port: Some(port),
            family: None,
            connect_timeout_secs: opts.connect_timeout_secs,
            timeout: opts.probe_timeout,
        };

        let mut outcomes = Vec::with_capacity(addresses.len());
        for addr in &addresses {
            let outcome = match self.probe(std::slice::from_ref(&addr.address), &probe_opts).await {
                Ok(output) if output.is_alive() => {
                    ProbeOutcome::new(host, &addr.address, port, ProbeStatus::Alive)
                        .with_keys(HostKey::parse_all(&output.stdout_lines))
                }
                Ok(output) => {
                    debug!(
                        host,
                        ip = %addr,
                        exit_code = ?output.exit_code,
                        stderr = ?output.stderr_lines,
                        "no host key"
                    );
                    ProbeOutcome::new(host, &addr.address, port, ProbeStatus::Unreachable)
                }
                Err(e) => {
                    warn!(host, ip = %addr, error = %e, "probe failed");
                    ProbeOutcome::new(host, &addr.address, port, ProbeStatus::Unreachable)
                }
            };

            let stop = outcome.is_alive() && opts.policy.stops_at_first_alive();
            outcomes.push(outcome);
            if stop {
                debug!(host, ip = %addr, "first live address found");
                break;
            }
        }

        info!(
            host,
            port = %port,
            alive = outcomes.iter().filter(|o| o.is_alive()).count(),
            probed = outcomes.len(),
            "host scanned"
        );
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use crate::exec::testing::{FakeRunner, Reply};
    use crate::exec::{CommandOutput, Invocation};
    use crate::resolver::testing::FakeLookup;
    use crate::types::AddressFamily;

    fn last_arg_to(program: &'static str, last: String) -> impl Fn(&Invocation) -> bool {
        move |inv: &Invocation| {
            inv.program == std::path::Path::new(program) && inv.args.last() == Some(&last)
        }
    }

    fn is_config_for(host: impl Into<String>) -> impl Fn(&Invocation) -> bool {
        last_arg_to("ssh", host.into())
    }

    fn is_probe_of(ip: impl Into<String>) -> impl Fn(&Invocation) -> bool {
        last_arg_to("ssh-keyscan", ip.into())
    }

    fn config(port: &str) -> Reply {
        Reply::Output(CommandOutput::new(0, format!("user git\nport {}\n", port), ""))
    }

    fn key_for(ip: &str) -> Reply {
        Reply::Output(CommandOutput::new(0, format!("{} ssh-ed25519 AAAAC3NzaC1lZDI1NTE5\n", ip), ""))
    }

    fn dead() -> Reply {
        Reply::Output(CommandOutput::new(1, "", ""))
    }

    fn scanner(runner: FakeRunner, lookup: FakeLookup) -> (KeyScanner, Arc<FakeRunner>, Arc<FakeLookup>) {
        let runner = Arc::new(runner);
        let lookup = Arc::new(lookup);
        let scanner = KeyScanner::new(runner.clone(), lookup.clone(), ToolPaths::default());
        (scanner, runner, lookup)
    }

    #[tokio::test]
    async fn test_port_from_config() {
        let (scanner, runner, _) = scanner(
            FakeRunner::new()
                .on(is_config_for("example.com"), config("2222"))
                .on(is_probe_of("192.168.1.1"), key_for("192.168.1.1")),
            FakeLookup::new().with("example.com", &["192.168.1.1"]),
        );
        let opts = ScanOptions::new().with_config_source(ConfigSource::from_arg("ssh_config"));

        let result = tokio_test::assert_ok!(scanner.scan(&["example.com"], &opts).await);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].hostname, "example.com");
        assert_eq!(result[0].ip, "192.168.1.1");
        assert_eq!(result[0].port, Port::new(2222).unwrap());
        assert_eq!(result[0].status, ProbeStatus::Alive);
        assert_eq!(result[0].keys.len(), 1);
        assert_eq!(result[0].keys[0].key_type, "ssh-ed25519");

        let config_calls = runner.calls_to("ssh");
        assert_eq!(config_calls.len(), 1);
        assert_eq!(config_calls[0].args, vec!["-G", "-F", "ssh_config", "--", "example.com"]);
        let probes = runner.calls_to("ssh-keyscan");
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].args, vec!["-p", "2222", "192.168.1.1"]);
    }

    #[tokio::test]
    async fn test_explicit_port_skips_config() {
        let (scanner, runner, _) = scanner(
            FakeRunner::new().on(is_probe_of("203.0.113.9"), dead()),
            FakeLookup::new().with("dead.example", &["203.0.113.9"]),
        );
        let opts = ScanOptions::new().with_port(Port::SSH);

        let result = scanner.scan(&["dead.example"], &opts).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].status, ProbeStatus::Unreachable);
        assert_eq!(result[0].port, Port::SSH);
        assert!(result[0].keys.is_empty());
        assert!(runner.calls_to("ssh").is_empty());
    }

    #[tokio::test]
    async fn test_empty_output_is_unreachable() {
        let (scanner, _, _) = scanner(
            FakeRunner::new().on(
                is_probe_of("203.0.113.9"),
                Reply::Output(CommandOutput::new(0, "\n", "")),
            ),
            FakeLookup::new().with("quiet.example", &["203.0.113.9"]),
        );
        let opts = ScanOptions::new().with_port(Port::SSH);

        let result = scanner.scan(&["quiet.example"], &opts).await.unwrap();
        assert_eq!(result[0].status, ProbeStatus::Unreachable);
    }

    #[tokio::test]
    async fn test_host_without_addresses_is_skipped() {
        let (scanner, runner, lookup) = scanner(
            FakeRunner::new().on(is_config_for("ipv6-only.example"), config("22")),
            FakeLookup::new().with("ipv6-only.example", &["2001:db8::1"]),
        );
        let opts = ScanOptions::new().with_policy(AddressFamilyPolicy::Ipv4);

        let result = scanner.scan(&["ipv6-only.example"], &opts).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(lookup.calls(), vec![("ipv6-only.example".to_string(), AddressFamily::V4)]);
        assert!(runner.calls_to("ssh-keyscan").is_empty());
    }

    #[tokio::test]
    async fn test_ip_literal_is_probed_without_lookup() {
        let (scanner, _, lookup) = scanner(
            FakeRunner::new().on(is_probe_of("192.168.1.1"), key_for("192.168.1.1")),
            FakeLookup::new(),
        );
        let opts = ScanOptions::new().with_port(Port::SSH);

        let result = scanner.scan(&["192.168.1.1"], &opts).await.unwrap();
        assert_eq!(result[0].ip, "192.168.1.1");
        assert!(result[0].is_alive());
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_multiple_hosts_keep_order() {
        let (scanner, _, _) = scanner(
            FakeRunner::new()
                .on(is_config_for("host1.example.com"), config("22"))
                .on(is_config_for("host2.example.com"), config("2222"))
                .on(is_probe_of("192.168.1.1"), key_for("192.168.1.1"))
                .on(is_probe_of("192.168.1.2"), key_for("192.168.1.2")),
            FakeLookup::new()
                .with("host1.example.com", &["192.168.1.1"])
                .with("host2.example.com", &["192.168.1.2"]),
        );

        let result = scanner
            .scan(&["host1.example.com", "host2.example.com"], &ScanOptions::new())
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].hostname, "host1.example.com");
        assert_eq!(result[0].port, Port::SSH);
        assert_eq!(result[1].hostname, "host2.example.com");
        assert_eq!(result[1].port, Port::new(2222).unwrap());
    }

    #[tokio::test]
    async fn test_every_address_probed_in_resolution_order() {
        let (scanner, runner, _) = scanner(
            FakeRunner::new()
                .on(is_probe_of("10.0.0.1"), dead())
                .on(is_probe_of("10.0.0.2"), key_for("10.0.0.2"))
                .on(is_probe_of("2001:db8::2"), key_for("2001:db8::2")),
            FakeLookup::new().with("multi.example", &["2001:db8::2", "10.0.0.1", "10.0.0.2"]),
        );
        let opts = ScanOptions::new().with_port(Port::SSH);

        let result = scanner.scan(&["multi.example"], &opts).await.unwrap();

        let seen: Vec<(&str, ProbeStatus)> = result.iter().map(|o| (o.ip.as_str(), o.status)).collect();
        assert_eq!(
            seen,
            vec![
                ("10.0.0.1", ProbeStatus::Unreachable),
                ("10.0.0.2", ProbeStatus::Alive),
                ("2001:db8::2", ProbeStatus::Alive),
            ]
        );
        assert_eq!(runner.calls_to("ssh-keyscan").len(), 3);
    }

    #[tokio::test]
    async fn test_any_policy_stops_at_first_alive() {
        let (scanner, runner, _) = scanner(
            FakeRunner::new()
                .on(is_probe_of("10.0.0.1"), dead())
                .on(is_probe_of("10.0.0.2"), key_for("10.0.0.2"))
                .on(is_probe_of("2001:db8::2"), key_for("2001:db8::2")),
            FakeLookup::new().with("multi.example", &["10.0.0.1", "10.0.0.2", "2001:db8::2"]),
        );
        let opts = ScanOptions::new()
            .with_port(Port::SSH)
            .with_policy(AddressFamilyPolicy::Any);

        let result = scanner.scan(&["multi.example"], &opts).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].ip, "10.0.0.2");
        assert!(result[1].is_alive());
        assert_eq!(runner.calls_to("ssh-keyscan").len(), 2);
    }

    #[tokio::test]
    async fn test_missing_port_aborts_scan() {
        let (scanner, runner, _) = scanner(
            FakeRunner::new()
                .on(is_config_for("good.example"), config("22"))
                .on(
                    is_config_for("broken.example"),
                    Reply::Output(CommandOutput::new(0, "user git\n", "")),
                )
                .on(|_| true, key_for("10.0.0.1")),
            FakeLookup::new()
                .with("good.example", &["10.0.0.1"])
                .with("broken.example", &["10.0.0.2"])
                .with("later.example", &["10.0.0.3"]),
        );

        let err = scanner
            .scan(&["good.example", "broken.example", "later.example"], &ScanOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::MissingPort { ref host, value: None } if host == "broken.example"));
        // Nothing after the failing host is looked up.
        assert!(!runner
            .calls_to("ssh")
            .iter()
            .any(|c| c.args.last().map(String::as_str) == Some("later.example")));
    }

    #[tokio::test]
    async fn test_invalid_config_port_is_missing_port() {
        let (scanner, _, _) = scanner(
            FakeRunner::new().on(is_config_for("odd.example"), config("ssh")),
            FakeLookup::new().with("odd.example", &["10.0.0.1"]),
        );
        let err = scanner.scan(&["odd.example"], &ScanOptions::new()).await.unwrap_err();
        assert!(matches!(err, ScanError::MissingPort { value: Some(ref v), .. } if v == "ssh"));
    }

    #[tokio::test]
    async fn test_config_failure_is_fatal() {
        let (scanner, _, _) = scanner(
            FakeRunner::new().on(
                is_config_for("example.com"),
                Reply::Output(CommandOutput::new(255, "", "Bad configuration option: foo\n")),
            ),
            FakeLookup::new().with("example.com", &["10.0.0.1"]),
        );
        let err = scanner.scan(&["example.com"], &ScanOptions::new()).await.unwrap_err();
        assert!(matches!(err, ScanError::ConfigLookup { ref diagnostic, .. } if diagnostic == "Bad configuration option: foo"));
    }

    #[tokio::test]
    async fn test_config_timeout_aborts_scan() {
        let (scanner, runner, _) = scanner(
            FakeRunner::new().on(is_config_for("slow.example"), Reply::Timeout),
            FakeLookup::new().with("slow.example", &["10.0.0.1"]),
        );
        let opts = ScanOptions::new().with_config_timeout(Some(Duration::from_millis(50)));

        let err = scanner
            .scan(&["slow.example", "later.example"], &opts)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::ConfigTimeout { ref host, .. } if host == "slow.example"));
        assert!(runner.calls_to("ssh-keyscan").is_empty());
    }

    #[tokio::test]
    async fn test_parallel_scan_reports_first_config_error_in_input_order() {
        let (scanner, _, _) = scanner(
            FakeRunner::new()
                .on(is_config_for("h1"), config("22"))
                .on(is_config_for("h2"), Reply::Output(CommandOutput::new(0, "user git\n", "")))
                .on(is_config_for("h3"), config("22"))
                .on(
                    is_config_for("h4"),
                    Reply::Output(CommandOutput::new(255, "", "Bad configuration option: foo\n")),
                )
                .on(is_probe_of("10.0.0.1"), key_for("10.0.0.1"))
                .on(is_probe_of("10.0.0.3"), key_for("10.0.0.3")),
            FakeLookup::new()
                .with("h1", &["10.0.0.1"])
                .with("h2", &["10.0.0.2"])
                .with("h3", &["10.0.0.3"])
                .with("h4", &["10.0.0.4"]),
        );
        let opts = ScanOptions::new().with_concurrency(4);

        for _ in 0..3 {
            let err = scanner.scan(&["h1", "h2", "h3", "h4"], &opts).await.unwrap_err();
            assert!(matches!(err, ScanError::MissingPort { ref host, .. } if host == "h2"));
        }
    }

    #[tokio::test]
    async fn test_dns_failure_is_absorbed() {
        let (scanner, _, _) = scanner(
            FakeRunner::new().on(is_probe_of("10.0.0.9"), key_for("10.0.0.9")),
            FakeLookup::new()
                .failing("broken-dns.example", AddressFamily::V4, LookupError::Failed("SERVFAIL".into()))
                .failing("broken-dns.example", AddressFamily::V6, LookupError::Failed("SERVFAIL".into()))
                .with("fine.example", &["10.0.0.9"]),
        );
        let opts = ScanOptions::new().with_port(Port::SSH);

        let result = scanner
            .scan(&["broken-dns.example", "fine.example"], &opts)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].hostname, "fine.example");
    }

    #[tokio::test]
    async fn test_probe_execution_failure_is_unreachable() {
        let (scanner, _, _) = scanner(
            FakeRunner::new()
                .on(is_probe_of("10.0.0.1"), Reply::SpawnFailure)
                .on(is_probe_of("10.0.0.2"), Reply::Timeout),
            FakeLookup::new().with("h.example", &["10.0.0.1", "10.0.0.2"]),
        );
        let opts = ScanOptions::new().with_port(Port::SSH);

        let result = scanner.scan(&["h.example"], &opts).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|o| o.status == ProbeStatus::Unreachable));
    }

    #[tokio::test]
    async fn test_parallel_scan_preserves_order_and_is_repeatable() {
        let hosts: Vec<String> = (1..=20).map(|i| format!("h{i}.example")).collect();
        let mut runner = FakeRunner::new();
        let mut lookup = FakeLookup::new();
        for i in 1..=20u8 {
            let ip = format!("10.0.0.{i}");
            lookup = lookup.with(&format!("h{i}.example"), &[ip.as_str()]);
            let reply = if i % 3 == 0 { dead() } else { key_for(&ip) };
            runner = runner.on(is_probe_of(ip), reply);
        }
        let (scanner, _, _) = scanner(runner, lookup);
        let opts = ScanOptions::new().with_port(Port::SSH).with_concurrency(8);

        let first = scanner.scan(&hosts, &opts).await.unwrap();
        let second = scanner.scan(&hosts, &opts).await.unwrap();

        assert_eq!(first.len(), 20);
        let names: Vec<&str> = first.iter().map(|o| o.hostname.as_str()).collect();
        let expected: Vec<&str> = hosts.iter().map(String::as_str).collect();
        assert_eq!(names, expected);
        assert_eq!(first[2].status, ProbeStatus::Unreachable);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_user_passed_to_config_lookup() {
        let (scanner, runner, _) = scanner(
            FakeRunner::new().on(is_config_for("db1"), config("22")),
            FakeLookup::new(),
        );
        let opts = ScanOptions::new().with_user("admin");

        let port = scanner.resolve_port("db1", &opts).await.unwrap();
        assert_eq!(port, Port::SSH);
        assert_eq!(runner.calls_to("ssh")[0].args, vec!["-G", "-l", "admin", "--", "db1"]);
    }
}
