//! End-to-end discovery runs over in-memory workspaces.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nudge_core::{DependencyKind, DiscoveryResult, FileDiscovery, FileSet, Result};
use nudge_discovery::{
    DependencyGroup, DiscoveryWorker, NullMetadataProvider, PackageMetadata,
    PackageMetadataProvider, PackageRequirement,
};

/// A provider backed by a fixed table, keyed by lowercased name + version.
struct StaticProvider {
    packages: HashMap<(String, String), PackageMetadata>,
}

impl StaticProvider {
    fn new(entries: Vec<(&str, &str, PackageMetadata)>) -> Self {
        Self {
            packages: entries
                .into_iter()
                .map(|(name, version, metadata)| {
                    ((name.to_ascii_lowercase(), version.to_string()), metadata)
                })
                .collect(),
        }
    }
}

impl PackageMetadataProvider for StaticProvider {
    fn lookup(&self, name: &str, version: &str) -> Result<Option<PackageMetadata>> {
        Ok(self
            .packages
            .get(&(name.to_ascii_lowercase(), version.to_string()))
            .cloned())
    }
}

fn discover(files: &FileSet) -> DiscoveryResult {
    DiscoveryWorker::new(&NullMetadataProvider).discover(files)
}

fn entry<'a>(result: &'a DiscoveryResult, path: &str) -> &'a FileDiscovery {
    result
        .projects
        .iter()
        .find(|project| project.file_path == Path::new(path))
        .unwrap_or_else(|| panic!("no result entry for {path}"))
}

/// Flattens an entry's records into comparable rows:
/// (name, version, kind, is_direct, is_transitive, is_update).
fn rows(entry: &FileDiscovery) -> Vec<(&str, Option<&str>, DependencyKind, bool, bool, bool)> {
    entry
        .dependencies
        .iter()
        .map(|dep| {
            (
                dep.name.as_str(),
                dep.version.as_deref(),
                dep.kind,
                dep.is_direct,
                dep.is_transitive,
                dep.is_update,
            )
        })
        .collect()
}

fn frameworks_of<'a>(entry: &'a FileDiscovery, name: &str) -> &'a [String] {
    &entry
        .dependencies
        .iter()
        .find(|dep| dep.name == name)
        .unwrap_or_else(|| panic!("no record for {name}"))
        .target_frameworks
}

#[test]
fn package_references_without_versions_are_reported_with_empty_versions() {
    let files = FileSet::new(
        "",
        [(
            "myproj.csproj",
            r#"
            <Project Sdk="Microsoft.NET.Sdk">
              <PropertyGroup>
                <TargetFrameworks>net7.0;net8.0</TargetFrameworks>
              </PropertyGroup>
              <ItemGroup Condition=" '$(TargetFramework)' == 'net7.0' ">
                <PackageReference Include="Package.A" Version="1.1.1" />
                <PackageReference Include="Package.B" />
              </ItemGroup>
              <ItemGroup Condition=" '$(TargetFramework)' == 'net8.0' ">
                <Reference Include="Package.C" />
              </ItemGroup>
            </Project>
            "#,
        )],
    );

    let result = discover(&files);
    assert_eq!(result.projects.len(), 1);
    assert!(result.central_file.is_none());

    let project = entry(&result, "myproj.csproj");
    assert_eq!(project.target_frameworks, ["net7.0", "net8.0"]);
    assert_eq!(
        rows(project),
        [
            ("Microsoft.NET.Sdk", None, DependencyKind::MsBuildSdk, false, false, false),
            ("Package.A", Some("1.1.1"), DependencyKind::PackageReference, true, false, false),
            ("Package.B", Some(""), DependencyKind::PackageReference, true, false, false),
        ]
    );
    // A reference visible under one framework context still applies under
    // the project's whole resolved set.
    assert_eq!(frameworks_of(project, "Package.A"), ["net7.0", "net8.0"]);
    assert_eq!(frameworks_of(project, "Package.B"), ["net7.0", "net8.0"]);
}

#[test]
fn central_package_pool_fills_in_versionless_references() {
    let files = FileSet::new(
        "",
        [
            (
                "Directory.Packages.props",
                r#"
                <Project>
                  <PropertyGroup>
                    <ManagePackageVersionsCentrally>true</ManagePackageVersionsCentrally>
                  </PropertyGroup>
                  <ItemGroup>
                    <PackageVersion Include="Microsoft.Extensions.DependencyModel" Version="1.1.1" />
                    <PackageVersion Include="System.Text.Json" version="2.2.2" />
                    <PackageVersion Include="Newtonsoft.Json">
                      <Version>3.3.3</Version>
                    </PackageVersion>
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "myproj.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup>
                    <TargetFrameworks>net7.0;net8.0</TargetFrameworks>
                  </PropertyGroup>
                  <ItemGroup>
                    <PackageReference Include="Microsoft.Extensions.DependencyModel" />
                    <PackageReference Include="System.Text.Json" />
                    <PackageReference Include="Newtonsoft.Json" />
                    <PackageReference Include="System.Collections.Specialized" Version="4.3.0" />
                    <PackageReference Include="Package.NoPin" Version="" />
                  </ItemGroup>
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    let project = entry(&result, "myproj.csproj");
    assert_eq!(
        rows(project),
        [
            ("Microsoft.NET.Sdk", None, DependencyKind::MsBuildSdk, false, false, false),
            (
                "Microsoft.Extensions.DependencyModel",
                Some("1.1.1"),
                DependencyKind::PackageReference,
                true,
                false,
                false
            ),
            ("System.Text.Json", Some("2.2.2"), DependencyKind::PackageReference, true, false, false),
            ("Newtonsoft.Json", Some("3.3.3"), DependencyKind::PackageReference, true, false, false),
            (
                "System.Collections.Specialized",
                Some("4.3.0"),
                DependencyKind::PackageReference,
                true,
                false,
                false
            ),
            // An explicit empty version never inherits from the pool.
            ("Package.NoPin", Some(""), DependencyKind::PackageReference, true, false, false),
        ]
    );

    // The central property participates in the project's model, ahead of
    // the project's own assignments.
    let property_names: Vec<&str> = project
        .properties
        .iter()
        .map(|prop| prop.name.as_str())
        .collect();
    assert_eq!(property_names, ["ManagePackageVersionsCentrally", "TargetFrameworks"]);
    assert_eq!(
        project.properties[0].defined_in,
        Path::new("Directory.Packages.props")
    );

    let central = result.central_file.as_ref().expect("central file entry");
    assert_eq!(central.file_path, Path::new("Directory.Packages.props"));
    assert_eq!(
        rows(central),
        [
            (
                "Microsoft.Extensions.DependencyModel",
                Some("1.1.1"),
                DependencyKind::PackageVersion,
                true,
                false,
                false
            ),
            ("System.Text.Json", Some("2.2.2"), DependencyKind::PackageVersion, true, false, false),
            ("Newtonsoft.Json", Some("3.3.3"), DependencyKind::PackageVersion, true, false, false),
        ]
    );
}

#[test]
fn shared_build_files_contribute_indirect_records_and_their_own_entries() {
    let files = FileSet::new(
        "",
        [
            (
                "project.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup>
                    <TargetFramework>net7.0</TargetFramework>
                  </PropertyGroup>
                </Project>
                "#,
            ),
            (
                "Directory.Build.props",
                r#"
                <Project>
                  <ItemGroup>
                    <PackageReference Include="NuGet.Versioning" Version="6.1.0" />
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "Directory.Build.targets",
                r#"
                <Project>
                  <ItemGroup>
                    <PackageReference Include="Microsoft.CodeAnalysis.Analyzers" Version="3.3.0">
                      <PrivateAssets>all</PrivateAssets>
                      <IncludeAssets>runtime; build; native</IncludeAssets>
                    </PackageReference>
                  </ItemGroup>
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    let paths: Vec<&Path> = result
        .projects
        .iter()
        .map(|entry| entry.file_path.as_path())
        .collect();
    assert_eq!(
        paths,
        [
            Path::new("project.csproj"),
            Path::new("Directory.Build.props"),
            Path::new("Directory.Build.targets"),
        ]
    );

    // Inherited records keep their declaring file and lose directness.
    let project = entry(&result, "project.csproj");
    assert_eq!(
        rows(project),
        [
            ("NuGet.Versioning", Some("6.1.0"), DependencyKind::PackageReference, false, false, false),
            ("Microsoft.NET.Sdk", None, DependencyKind::MsBuildSdk, false, false, false),
            (
                "Microsoft.CodeAnalysis.Analyzers",
                Some("3.3.0"),
                DependencyKind::PackageReference,
                false,
                false,
                false
            ),
        ]
    );
    assert_eq!(
        project.dependencies[0].declared_in,
        Path::new("Directory.Build.props")
    );
    assert_eq!(frameworks_of(project, "NuGet.Versioning"), ["net7.0"]);

    // The shared files report the same declarations as direct.
    let props = entry(&result, "Directory.Build.props");
    assert_eq!(
        rows(props),
        [("NuGet.Versioning", Some("6.1.0"), DependencyKind::PackageReference, true, false, false)]
    );
    let targets = entry(&result, "Directory.Build.targets");
    assert_eq!(
        rows(targets),
        [(
            "Microsoft.CodeAnalysis.Analyzers",
            Some("3.3.0"),
            DependencyKind::PackageReference,
            true,
            false,
            false
        )]
    );
}

#[test]
fn legacy_packages_props_with_sdk_activation_applies_globals_and_updates() {
    let files = FileSet::new(
        "",
        [
            (
                "myproj.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup>
                    <TargetFramework>net7.0</TargetFramework>
                  </PropertyGroup>
                  <ItemGroup>
                    <PackageReference Include="Microsoft.AspNetCore.App" />
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "Packages.props",
                r#"
                <Project>
                  <ItemGroup>
                    <GlobalPackageReference Include="Microsoft.SourceLink.GitHub" Version="1.0.0-beta2-19367-01" />
                  </ItemGroup>
                  <ItemGroup>
                    <PackageReference Update="System.Lycos" Version="3.23.3" />
                    <PackageReference Update="AskJeeves" Version="2.2.2" />
                    <PackageReference Update="@(GlobalPackageReference)" PrivateAssets="All" />
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "Directory.Build.targets",
                r#"
                <Project>
                  <Sdk Name="Microsoft.Build.CentralPackageVersions" Version="2.1.3" />
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    let project = entry(&result, "myproj.csproj");
    assert_eq!(
        rows(project),
        [
            ("Microsoft.NET.Sdk", None, DependencyKind::MsBuildSdk, false, false, false),
            (
                "Microsoft.AspNetCore.App",
                Some(""),
                DependencyKind::PackageReference,
                true,
                false,
                false
            ),
            (
                "Microsoft.Build.CentralPackageVersions",
                Some("2.1.3"),
                DependencyKind::MsBuildSdk,
                false,
                false,
                false
            ),
            (
                "Microsoft.SourceLink.GitHub",
                Some("1.0.0-beta2-19367-01"),
                DependencyKind::GlobalPackageReference,
                true,
                false,
                false
            ),
        ]
    );
    let global = project
        .dependencies
        .iter()
        .find(|dep| dep.name == "Microsoft.SourceLink.GitHub")
        .unwrap();
    assert_eq!(global.declared_in, Path::new("Packages.props"));
    assert_eq!(global.target_frameworks, ["net7.0"]);

    // The legacy file is the central entry; named updates are kept, the
    // wildcard update creates nothing.
    let central = result.central_file.as_ref().expect("central file entry");
    assert_eq!(central.file_path, Path::new("Packages.props"));
    assert_eq!(
        rows(central),
        [
            (
                "Microsoft.SourceLink.GitHub",
                Some("1.0.0-beta2-19367-01"),
                DependencyKind::GlobalPackageReference,
                true,
                false,
                false
            ),
            ("System.Lycos", Some("3.23.3"), DependencyKind::PackageReference, true, false, true),
            ("AskJeeves", Some("2.2.2"), DependencyKind::PackageReference, true, false, true),
        ]
    );
}

#[test]
fn wildcard_update_with_version_decorates_existing_globals() {
    let files = FileSet::new(
        "",
        [
            (
                "myproj.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup>
                    <TargetFramework>net8.0</TargetFramework>
                  </PropertyGroup>
                </Project>
                "#,
            ),
            (
                "Directory.Packages.props",
                r#"
                <Project>
                  <PropertyGroup>
                    <ManagePackageVersionsCentrally>true</ManagePackageVersionsCentrally>
                  </PropertyGroup>
                  <ItemGroup>
                    <GlobalPackageReference Include="Package.Global" Version="1.0.0" />
                    <PackageReference Update="@(GlobalPackageReference)" Version="9.9.9" />
                  </ItemGroup>
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    let central = result.central_file.as_ref().expect("central file entry");
    assert_eq!(
        rows(central),
        [("Package.Global", Some("9.9.9"), DependencyKind::GlobalPackageReference, true, false, false)]
    );

    // The implicit per-project record reports the decorated version too.
    let project = entry(&result, "myproj.csproj");
    let implicit = project
        .dependencies
        .iter()
        .find(|dep| dep.name == "Package.Global")
        .expect("implicit global record");
    assert_eq!(implicit.version.as_deref(), Some("9.9.9"));
}

#[test]
fn update_under_central_management_stays_a_single_record() {
    let files = FileSet::new(
        "",
        [
            (
                "myproj.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup>
                    <TargetFramework>net8.0</TargetFramework>
                  </PropertyGroup>
                  <ItemGroup>
                    <PackageReference Update="System.Lycos" />
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "Directory.Packages.props",
                r#"
                <Project>
                  <PropertyGroup>
                    <ManagePackageVersionsCentrally>true</ManagePackageVersionsCentrally>
                  </PropertyGroup>
                  <ItemGroup>
                    <PackageVersion Include="System.Lycos" Version="3.23.3" />
                  </ItemGroup>
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    let project = entry(&result, "myproj.csproj");
    assert_eq!(
        rows(project),
        [
            ("Microsoft.NET.Sdk", None, DependencyKind::MsBuildSdk, false, false, false),
            ("System.Lycos", Some("3.23.3"), DependencyKind::PackageReference, true, false, true),
        ]
    );
}

#[test]
fn item_level_conditions_gate_individual_references() {
    let files = FileSet::new(
        "",
        [(
            "myproj.csproj",
            r#"
            <Project Sdk="Microsoft.NET.Sdk">
              <PropertyGroup>
                <TargetFramework>net8.0</TargetFramework>
              </PropertyGroup>
              <ItemGroup>
                <PackageReference Include="Package.Old" Version="1.0.0" Condition=" '$(TargetFramework)' == 'net7.0' " />
                <PackageReference Include="Package.New" Version="2.0.0" Condition=" '$(TargetFramework)' == 'net8.0' " />
                <PackageReference Include="Package.Always" Version="3.0.0" />
              </ItemGroup>
            </Project>
            "#,
        )],
    );

    let result = discover(&files);
    let project = entry(&result, "myproj.csproj");
    assert_eq!(
        rows(project),
        [
            ("Microsoft.NET.Sdk", None, DependencyKind::MsBuildSdk, false, false, false),
            ("Package.New", Some("2.0.0"), DependencyKind::PackageReference, true, false, false),
            ("Package.Always", Some("3.0.0"), DependencyKind::PackageReference, true, false, false),
        ]
    );
}

#[test]
fn global_references_apply_to_every_project() {
    let files = FileSet::new(
        "",
        [
            (
                "a/a.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
                </Project>
                "#,
            ),
            (
                "b/b.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup><TargetFramework>net7.0</TargetFramework></PropertyGroup>
                </Project>
                "#,
            ),
            (
                "Directory.Packages.props",
                r#"
                <Project>
                  <PropertyGroup>
                    <ManagePackageVersionsCentrally>true</ManagePackageVersionsCentrally>
                  </PropertyGroup>
                  <ItemGroup>
                    <GlobalPackageReference Include="Package.Audit" Version="2.0.0" />
                  </ItemGroup>
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    for (path, framework) in [("a/a.csproj", "net8.0"), ("b/b.csproj", "net7.0")] {
        let project = entry(&result, path);
        let global = project
            .dependencies
            .iter()
            .find(|dep| dep.name == "Package.Audit")
            .unwrap_or_else(|| panic!("{path} missing global reference"));
        assert_eq!(global.kind, DependencyKind::GlobalPackageReference);
        assert_eq!(global.version.as_deref(), Some("2.0.0"));
        assert!(global.is_direct);
        assert_eq!(global.target_frameworks, [framework]);
        assert_eq!(global.declared_in, Path::new("Directory.Packages.props"));
    }
}

#[test]
fn unresolvable_versions_are_kept_raw_and_flagged() {
    let files = FileSet::new(
        "",
        [(
            "myproj.csproj",
            r#"
            <Project Sdk="Microsoft.NET.Sdk">
              <PropertyGroup>
                <TargetFramework>net8.0</TargetFramework>
              </PropertyGroup>
              <ItemGroup>
                <PackageReference Include="Package.A" Version="1.1.1" />
                <PackageReference Include="Package.B" Version="$(ThisPropertyCannotBeResolved)" />
              </ItemGroup>
            </Project>
            "#,
        )],
    );

    let result = discover(&files);
    let project = entry(&result, "myproj.csproj");
    let b = project
        .dependencies
        .iter()
        .find(|dep| dep.name == "Package.B")
        .unwrap();
    assert_eq!(b.version.as_deref(), Some("$(ThisPropertyCannotBeResolved)"));
    assert!(b.is_unresolved);
    let a = project
        .dependencies
        .iter()
        .find(|dep| dep.name == "Package.A")
        .unwrap();
    assert!(!a.is_unresolved);
}

#[test]
fn projects_without_resolvable_frameworks_are_dropped() {
    let files = FileSet::new(
        "",
        [
            (
                "broken.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup>
                    <TargetFramework>$(CommonTargetFramework)</TargetFramework>
                  </PropertyGroup>
                  <ItemGroup>
                    <PackageReference Include="Package.A" Version="1.1.1" />
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "ok.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    let paths: Vec<&Path> = result
        .projects
        .iter()
        .map(|entry| entry.file_path.as_path())
        .collect();
    assert_eq!(paths, [Path::new("ok.csproj")]);
}

#[test]
fn malformed_projects_are_skipped_without_failing_siblings() {
    let files = FileSet::new(
        "",
        [
            ("bad.csproj", "<Project><PropertyGroup>"),
            (
                "good.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    assert_eq!(result.projects.len(), 1);
    assert_eq!(result.projects[0].file_path, Path::new("good.csproj"));
}

#[test]
fn transitive_packages_are_walked_through_the_provider() {
    let provider = StaticProvider::new(vec![
        (
            "Some.Package",
            "1.2.3.4",
            PackageMetadata {
                groups: vec![DependencyGroup {
                    target_framework: None,
                    requirements: vec![PackageRequirement {
                        name: "Transitive.Dependency".into(),
                        version: "5.6.7.8".into(),
                    }],
                }],
                shipped_frameworks: vec!["net7.0".into(), "net8.0".into()],
            },
        ),
        (
            "Transitive.Dependency",
            "5.6.7.8",
            PackageMetadata {
                groups: Vec::new(),
                shipped_frameworks: vec!["net7.0".into(), "net8.0".into()],
            },
        ),
    ]);
    let files = FileSet::new(
        "",
        [(
            "myproj.csproj",
            r#"
            <Project Sdk="Microsoft.NET.Sdk">
              <PropertyGroup>
                <TargetFrameworks>net7.0;net8.0</TargetFrameworks>
              </PropertyGroup>
              <ItemGroup>
                <PackageReference Include="Some.Package" Version="1.2.3.4" />
              </ItemGroup>
            </Project>
            "#,
        )],
    );

    let result = DiscoveryWorker::new(&provider).discover(&files);
    let project = entry(&result, "myproj.csproj");
    assert_eq!(
        rows(project),
        [
            ("Microsoft.NET.Sdk", None, DependencyKind::MsBuildSdk, false, false, false),
            ("Some.Package", Some("1.2.3.4"), DependencyKind::PackageReference, true, false, false),
            (
                "Transitive.Dependency",
                Some("5.6.7.8"),
                DependencyKind::Unknown,
                false,
                true,
                false
            ),
        ]
    );
    assert_eq!(
        frameworks_of(project, "Transitive.Dependency"),
        ["net7.0", "net8.0"]
    );
}

#[test]
fn transitive_frameworks_are_restricted_to_shipped_folders() {
    let provider = StaticProvider::new(vec![
        (
            "Some.Package",
            "1.0.0",
            PackageMetadata {
                groups: vec![DependencyGroup {
                    target_framework: None,
                    requirements: vec![PackageRequirement {
                        name: "Narrow.Dependency".into(),
                        version: "2.0.0".into(),
                    }],
                }],
                shipped_frameworks: vec!["net7.0".into(), "net8.0".into()],
            },
        ),
        (
            "Narrow.Dependency",
            "2.0.0",
            PackageMetadata {
                groups: Vec::new(),
                shipped_frameworks: vec!["net7.0".into()],
            },
        ),
    ]);
    let files = FileSet::new(
        "",
        [(
            "myproj.csproj",
            r#"
            <Project Sdk="Microsoft.NET.Sdk">
              <PropertyGroup>
                <TargetFrameworks>net7.0;net8.0</TargetFrameworks>
              </PropertyGroup>
              <ItemGroup>
                <PackageReference Include="Some.Package" Version="1.0.0" />
              </ItemGroup>
            </Project>
            "#,
        )],
    );

    let result = DiscoveryWorker::new(&provider).discover(&files);
    let project = entry(&result, "myproj.csproj");
    assert_eq!(frameworks_of(project, "Narrow.Dependency"), ["net7.0"]);
}

#[test]
fn transitive_expansion_never_shadows_declared_records() {
    let provider = StaticProvider::new(vec![(
        "Some.Package",
        "1.0.0",
        PackageMetadata {
            groups: vec![DependencyGroup {
                target_framework: None,
                requirements: vec![PackageRequirement {
                    name: "Also.Declared".into(),
                    version: "0.9.0".into(),
                }],
            }],
            shipped_frameworks: vec!["net8.0".into()],
        },
    )]);
    let files = FileSet::new(
        "",
        [(
            "myproj.csproj",
            r#"
            <Project Sdk="Microsoft.NET.Sdk">
              <PropertyGroup>
                <TargetFramework>net8.0</TargetFramework>
              </PropertyGroup>
              <ItemGroup>
                <PackageReference Include="Some.Package" Version="1.0.0" />
                <PackageReference Include="Also.Declared" Version="1.5.0" />
              </ItemGroup>
            </Project>
            "#,
        )],
    );

    let result = DiscoveryWorker::new(&provider).discover(&files);
    let project = entry(&result, "myproj.csproj");
    let declared = project
        .dependencies
        .iter()
        .find(|dep| dep.name == "Also.Declared")
        .unwrap();
    assert_eq!(declared.kind, DependencyKind::PackageReference);
    assert_eq!(declared.version.as_deref(), Some("1.5.0"));
    assert!(!declared.is_transitive);
    assert_eq!(
        project
            .dependencies
            .iter()
            .filter(|dep| dep.name == "Also.Declared")
            .count(),
        1
    );
}

#[test]
fn project_references_are_reported() {
    let files = FileSet::new(
        "",
        [
            (
                "app/app.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
                  <ItemGroup>
                    <ProjectReference Include="../lib/lib.csproj" />
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "lib/lib.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
                </Project>
                "#,
            ),
        ],
    );

    let result = discover(&files);
    let app = entry(&result, "app/app.csproj");
    assert_eq!(
        app.referenced_project_paths,
        [PathBuf::from("../lib/lib.csproj")]
    );
}

#[test]
fn repeated_runs_yield_identical_results() {
    let files = FileSet::new(
        "workspace",
        [
            (
                "one.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup><TargetFrameworks>net7.0;net8.0</TargetFrameworks></PropertyGroup>
                  <ItemGroup>
                    <PackageReference Include="Package.A" Version="1.0.0" />
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "two.csproj",
                r#"
                <Project Sdk="Microsoft.NET.Sdk">
                  <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
                  <ItemGroup>
                    <PackageReference Include="Package.B" Version="2.0.0" />
                  </ItemGroup>
                </Project>
                "#,
            ),
            (
                "Directory.Build.props",
                r#"
                <Project>
                  <ItemGroup>
                    <PackageReference Include="Shared.Analyzer" Version="0.1.0" />
                  </ItemGroup>
                </Project>
                "#,
            ),
        ],
    );

    let first = discover(&files);
    let second = discover(&files);
    assert_eq!(first, second);
    assert_eq!(first.workspace_path, Path::new("workspace"));

    // The report serializes stably as well.
    let json_first = serde_json::to_string(&first).unwrap();
    let json_second = serde_json::to_string(&second).unwrap();
    assert_eq!(json_first, json_second);
    let parsed: DiscoveryResult = serde_json::from_str(&json_first).unwrap();
    assert_eq!(parsed, first);
}
