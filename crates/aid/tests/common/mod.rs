//! Shared fixtures for the integration tests

#![allow(dead_code, unreachable_pub)]

use std::collections::HashSet;

use euicc_aid::{CardGateway, ProbeStrategy};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
#[error("scripted card: {0}")]
pub struct ScriptedError(pub String);

/// Card that answers a fixed set of AIDs and logs every operation
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    pub aid: String,
    pub euicc_aids: HashSet<String>,
    pub uicc_aids: HashSet<String>,
    pub log: Vec<(ProbeStrategy, String)>,
    /// Every AID applied through `set_aid`, in order
    pub applied: Vec<String>,
}

impl ScriptedGateway {
    pub fn new(aid: &str) -> Self {
        Self {
            aid: aid.to_string(),
            ..Default::default()
        }
    }

    /// Answer profile listing (an eUICC) for `aid`
    pub fn euicc(mut self, aid: &str) -> Self {
        self.euicc_aids.insert(aid.to_string());
        self
    }

    /// Answer only the chip info read (a plain UICC) for `aid`
    pub fn uicc(mut self, aid: &str) -> Self {
        self.uicc_aids.insert(aid.to_string());
        self
    }

    pub fn probed(&self) -> Vec<String> {
        let mut aids: Vec<String> = Vec::new();
        for (_, aid) in &self.log {
            if aids.last() != Some(aid) {
                aids.push(aid.clone());
            }
        }
        aids
    }
}

impl CardGateway for ScriptedGateway {
    type Error = ScriptedError;

    fn aid(&self) -> &str {
        &self.aid
    }

    fn set_aid(&mut self, aid: &str) {
        self.applied.push(aid.to_string());
        self.aid = aid.to_string();
    }

    fn list_profiles(&mut self) -> Result<Value, Self::Error> {
        self.log.push((ProbeStrategy::ListProfiles, self.aid.clone()));
        if self.euicc_aids.contains(&self.aid) {
            Ok(json!([{ "iccid": "8944000000000000001", "profileState": "enabled" }]))
        } else {
            Err(ScriptedError(format!("6A82 for {}", self.aid)))
        }
    }

    fn read_chip_info(&mut self) -> Result<Value, Self::Error> {
        self.log.push((ProbeStrategy::ChipInfo, self.aid.clone()));
        if self.euicc_aids.contains(&self.aid) || self.uicc_aids.contains(&self.aid) {
            Ok(json!({ "eidValue": "89049032000000000000000000000001" }))
        } else {
            Err(ScriptedError(format!("6A82 for {}", self.aid)))
        }
    }
}

pub const GSMA: &str = "A0000005591010FFFFFFFF8900000100";
pub const FIVE_BER: &str = "A0000005591010FFFFFFFF8900050500";
pub const XESIM: &str = "A0000005591010FFFFFFFF8900000177";
pub const USIM: &str = "A0000000871002";
pub const VISA: &str = "A0000000031010";

/// Three ISD-R entries and two others, interleaved
pub const CATALOG: &str = "\
Filetype: AID list
Version: 1
# Mixed catalog
A0000000871002: USIM
A0000005591010FFFFFFFF8900000100: GSMA default
A0000000031010: Visa Credit
A0000005591010FFFFFFFF8900050500: 5ber
A0000005591010FFFFFFFF8900000177: xesim
";
