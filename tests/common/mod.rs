use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use xmlfixture::{FixtureConfig, TestDataReader};

pub const TEST_DATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TestData>
  <Shared>
    <adminUser>root</adminUser>
  </Shared>
  <APP_QA>
    <Login>
      <Case name="A"><user>alice</user><password>secret</password></Case>
      <Case name="B"><user>//Shared/adminUser</user><password>pw</password></Case>
    </Login>
    <Menu><item1>Home</item1><item2>Reports</item2><other>Help</other></Menu>
    <Labels><title lang="en">Welcome</title></Labels>
  </APP_QA>
  <APP_PROD>
    <Login>
      <Case name="P"><user>prod</user></Case>
    </Login>
  </APP_PROD>
</TestData>
"#;

/// Temporary resource root holding the given files
pub struct Fixtures {
    pub dir: TempDir,
}

impl Fixtures {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        Fixtures { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn config(&self, host: &str) -> FixtureConfig {
        FixtureConfig {
            test_data_file: Some("TestData.xml".to_string()),
            host: host.to_string(),
            resource_roots: vec![self.root()],
            ..FixtureConfig::default()
        }
    }

    /// Reader over `TestData.xml`, already initialized
    pub fn reader(&self, host: &str) -> TestDataReader {
        let reader = TestDataReader::new(self.config(host));
        reader.initialize(None).unwrap();
        reader
    }
}

pub fn standard() -> Fixtures {
    Fixtures::new(&[("TestData.xml", TEST_DATA)])
}
