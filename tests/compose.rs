// ABOUTME: Tests for compose manifest discovery and service extraction.
// ABOUTME: Builds directory trees in temp dirs and scans them.

use dockscout::compose::{self, parse_services};
use dockscout::diagnostics::WarningKind;
use std::fs;
use std::path::{Path, PathBuf};

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

mod scanning {
    use super::*;

    #[tokio::test]
    async fn finds_services_across_stacks() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("media/docker-compose.yml"),
            "services:\n  jellyfin:\n    image: jellyfin/jellyfin:10.9\n  builder:\n    build: .\n",
        );
        write(
            &root.join("infra/proxy/compose.yaml"),
            "services:\n  traefik:\n    image: traefik:v3\n",
        );
        write(&root.join("notes/readme.md"), "not a manifest");

        let scan = compose::scan(vec![root.to_path_buf()], 6).await;

        assert_eq!(scan.manifests.len(), 2);
        assert!(scan.manifests.iter().all(|p| p.is_absolute()));
        assert!(!scan.diagnostics.has_warnings());

        let mut found: Vec<_> = scan
            .services
            .iter()
            .map(|s| (s.stack.as_str(), s.service.as_str(), s.image.as_str()))
            .collect();
        found.sort();
        assert_eq!(
            found,
            vec![
                ("media", "jellyfin", "jellyfin/jellyfin:10.9"),
                ("proxy", "traefik", "traefik:v3"),
            ]
        );
    }

    #[tokio::test]
    async fn skips_hidden_and_dependency_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join(".git/compose.yml"), "services:\n  a:\n    image: a\n");
        write(
            &root.join("web/node_modules/pkg/compose.yml"),
            "services:\n  b:\n    image: b\n",
        );
        write(&root.join("web/compose.yml"), "services:\n  c:\n    image: c\n");

        let scan = compose::scan(vec![root.to_path_buf()], 6).await;

        assert_eq!(scan.services.len(), 1);
        assert_eq!(scan.services[0].service, "c");
    }

    #[tokio::test]
    async fn depth_limit_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a/compose.yml"), "services:\n  shallow:\n    image: x\n");
        write(
            &root.join("a/b/c/compose.yml"),
            "services:\n  deep:\n    image: y\n",
        );

        let scan = compose::scan(vec![root.to_path_buf()], 1).await;

        let names: Vec<_> = scan.services.iter().map(|s| s.service.as_str()).collect();
        assert_eq!(names, vec!["shallow"]);
    }

    #[tokio::test]
    async fn broken_inputs_become_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("bad/compose.yml"), "services: [unterminated\n");
        write(&root.join("good/compose.yml"), "services:\n  ok:\n    image: ok:1\n");
        let missing = root.join("does-not-exist");

        let scan = compose::scan(vec![root.to_path_buf(), missing], 6).await;

        assert_eq!(scan.services.len(), 1);
        let kinds: Vec<_> = scan.diagnostics.warnings().iter().map(|w| w.kind).collect();
        assert!(kinds.contains(&WarningKind::MalformedManifest));
        assert!(kinds.contains(&WarningKind::UnreadableDirectory));
    }
}

mod parsing {
    use super::*;

    #[test]
    fn preserves_declaration_order_and_skips_imageless() {
        let yaml = r#"
services:
  zeta:
    image: z:1
  built:
    build: ./app
  alpha:
    image: "ghcr.io/org/alpha:2"
  empty:
    image: ""
  weird: 42
"#;
        let services = parse_services(Path::new("/srv/shop/compose.yml"), yaml).unwrap();

        let names: Vec<_> = services.iter().map(|s| s.service.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(services.iter().all(|s| s.stack == "shop"));
        assert_eq!(services[1].compose_file, PathBuf::from("/srv/shop/compose.yml"));
    }

    #[test]
    fn manifest_without_services_is_empty() {
        let services = parse_services(Path::new("/srv/x/compose.yml"), "version: '3'\n").unwrap();
        assert!(services.is_empty());
    }
}
