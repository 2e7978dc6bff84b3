//! Declarative description of the sample stack: an encrypted, versioned
//! bucket and the KMS key that encrypts it.
//!
//! Declarations render to a CloudFormation-shaped template so the synth
//! output can be reviewed and diffed like any other template.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

#[cfg(test)]
#[path = "stack_tests.rs"]
mod tests;

pub const STACK_CONSTRUCT_ID: &str = "CdkSampleRepoStack";
pub const STACK_DESCRIPTION: &str = "Dieser Cloudformation Stack erzeugt den Sample Stack.";
pub const BUCKET_KEY_ID: &str = "BucketKey";
pub const BUCKET_KEY_ALIAS: &str = "BucketKey/MyBucketSampleRepo";
pub const BUCKET_ID: &str = "MyBucket";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalPolicy {
    Retain,
    Destroy,
}

impl RemovalPolicy {
    fn as_str(&self) -> &'static str {
        match self {
            RemovalPolicy::Retain => "Retain",
            RemovalPolicy::Destroy => "Delete",
        }
    }
}

/// A security-check finding that is accepted for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NagSuppression {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KmsKey {
    pub logical_id: String,
    pub description: String,
    pub enabled: bool,
    pub enable_key_rotation: bool,
    pub alias: String,
    pub removal_policy: RemovalPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub logical_id: String,
    pub block_public_access: bool,
    pub versioned: bool,
    pub enforce_ssl: bool,
    /// Logical id of the key the bucket is encrypted with.
    pub encryption_key: String,
    pub removal_policy: RemovalPolicy,
    pub suppressions: Vec<NagSuppression>,
}

/// Account and region a stack deploys to. Either may be left to the
/// deployment tool's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentEnvironment {
    pub account: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDefinition {
    pub construct_id: String,
    pub stack_name: String,
    pub description: String,
    pub stage: String,
    pub environment: DeploymentEnvironment,
    pub key: KmsKey,
    pub bucket: Bucket,
    pub tags: BTreeMap<String, String>,
}

impl StackDefinition {
    /// The sample stack for `stage`, named `mrht-{stage}-sample-stack`.
    pub fn sample(stage: &str, environment: DeploymentEnvironment) -> Self {
        let key = KmsKey {
            logical_id: BUCKET_KEY_ID.to_string(),
            description: format!("This key is used for encrypting contents of {BUCKET_ID}"),
            enabled: true,
            enable_key_rotation: true,
            alias: BUCKET_KEY_ALIAS.to_string(),
            removal_policy: RemovalPolicy::Retain,
        };

        let bucket = Bucket {
            logical_id: BUCKET_ID.to_string(),
            block_public_access: true,
            versioned: true,
            enforce_ssl: true,
            encryption_key: key.logical_id.clone(),
            removal_policy: RemovalPolicy::Retain,
            suppressions: vec![NagSuppression {
                id: "AwsSolutions-S1".to_string(),
                reason: "This bucket does not hold customer data".to_string(),
            }],
        };

        Self {
            construct_id: STACK_CONSTRUCT_ID.to_string(),
            stack_name: format!("mrht-{stage}-sample-stack"),
            description: STACK_DESCRIPTION.to_string(),
            stage: stage.to_string(),
            environment,
            key,
            bucket,
            tags: BTreeMap::new(),
        }
    }

    /// Adds a tag to the stack; it is applied to every taggable resource.
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Renders the stack as a CloudFormation template.
    pub fn template(&self) -> Value {
        let mut resources = Map::new();
        let tags = self.tag_list();

        resources.insert(
            self.key.logical_id.clone(),
            json!({
                "Type": "AWS::KMS::Key",
                "Properties": {
                    "Description": self.key.description,
                    "Enabled": self.key.enabled,
                    "EnableKeyRotation": self.key.enable_key_rotation,
                    "Tags": tags,
                },
                "UpdateReplacePolicy": self.key.removal_policy.as_str(),
                "DeletionPolicy": self.key.removal_policy.as_str(),
            }),
        );

        resources.insert(
            format!("{}Alias", self.key.logical_id),
            json!({
                "Type": "AWS::KMS::Alias",
                "Properties": {
                    "AliasName": format!("alias/{}", self.key.alias),
                    "TargetKeyId": { "Fn::GetAtt": [self.key.logical_id, "Arn"] },
                },
                "UpdateReplacePolicy": self.key.removal_policy.as_str(),
                "DeletionPolicy": self.key.removal_policy.as_str(),
            }),
        );

        let mut bucket_properties = json!({
            "BucketEncryption": {
                "ServerSideEncryptionConfiguration": [{
                    "ServerSideEncryptionByDefault": {
                        "SSEAlgorithm": "aws:kms",
                        "KMSMasterKeyID": { "Fn::GetAtt": [self.bucket.encryption_key, "Arn"] },
                    }
                }]
            },
            "Tags": tags,
        });
        if self.bucket.block_public_access {
            bucket_properties["PublicAccessBlockConfiguration"] = json!({
                "BlockPublicAcls": true,
                "BlockPublicPolicy": true,
                "IgnorePublicAcls": true,
                "RestrictPublicBuckets": true,
            });
        }
        if self.bucket.versioned {
            bucket_properties["VersioningConfiguration"] = json!({ "Status": "Enabled" });
        }

        resources.insert(
            self.bucket.logical_id.clone(),
            json!({
                "Type": "AWS::S3::Bucket",
                "Properties": bucket_properties,
                "UpdateReplacePolicy": self.bucket.removal_policy.as_str(),
                "DeletionPolicy": self.bucket.removal_policy.as_str(),
                "Metadata": {
                    "cdk_nag": { "rules_to_suppress": self.bucket.suppressions },
                },
            }),
        );

        if self.bucket.enforce_ssl {
            resources.insert(
                format!("{}Policy", self.bucket.logical_id),
                json!({
                    "Type": "AWS::S3::BucketPolicy",
                    "Properties": {
                        "Bucket": { "Ref": self.bucket.logical_id },
                        "PolicyDocument": {
                            "Version": "2012-10-17",
                            "Statement": [{
                                "Action": "s3:*",
                                "Condition": { "Bool": { "aws:SecureTransport": "false" } },
                                "Effect": "Deny",
                                "Principal": { "AWS": "*" },
                                "Resource": [
                                    { "Fn::GetAtt": [self.bucket.logical_id, "Arn"] },
                                    { "Fn::Join": ["", [{ "Fn::GetAtt": [self.bucket.logical_id, "Arn"] }, "/*"]] },
                                ],
                            }],
                        },
                    },
                }),
            );
        }

        json!({
            "Description": self.description,
            "Resources": resources,
        })
    }

    fn tag_list(&self) -> Vec<Value> {
        self.tags
            .iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value }))
            .collect()
    }
}
