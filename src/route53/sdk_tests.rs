// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `sdk.rs`
//!
//! The SDK clients are pointed at a local mock server, so requests go through the
//! real serializers, URL builders and error parsers.

#[cfg(test)]
mod tests {
    use aws_sdk_route53::config::retry::RetryConfig;
    use aws_sdk_route53::config::{BehaviorVersion, Credentials, Region};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::constants::{DNSZONE_OWNER_TAG, HOSTED_ZONE_RESOURCE_TYPE_FILTER};
    use crate::dns_errors::ProviderError;
    use crate::route53::sdk::SdkRoute53Client;
    use crate::route53::{Route53Api, Tag};

    const ROUTE53_XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";
    const GET_RESOURCES_TARGET: &str = "ResourceGroupsTaggingAPI_20170126.GetResources";

    fn sdk_client(endpoint: &str) -> SdkRoute53Client {
        let credentials = Credentials::new("AKIDTEST", "secret", None, None, "sdk-tests");
        let region = Region::new("us-east-1");

        let route53 = aws_sdk_route53::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region.clone())
            .credentials_provider(credentials.clone())
            .endpoint_url(endpoint)
            .retry_config(RetryConfig::disabled())
            .build();
        let tagging = aws_sdk_resourcegroupstagging::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .retry_config(RetryConfig::disabled())
            .build();

        SdkRoute53Client::from_clients(
            aws_sdk_route53::Client::from_conf(route53),
            aws_sdk_resourcegroupstagging::Client::from_conf(tagging),
            "us-east-1",
        )
    }

    fn xml(status: u16, body: String) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_raw(body, "text/xml")
    }

    fn route53_error(code: &str, message: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ErrorResponse xmlns="{ROUTE53_XMLNS}"><Error><Type>Sender</Type><Code>{code}</Code><Message>{message}</Message></Error><RequestId>req-1</RequestId></ErrorResponse>"#
        )
    }

    async fn request_paths(server: &MockServer) -> Vec<String> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.url.path().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_list_tags_strips_hosted_zone_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2013-04-01/tags/hostedzone/Z123"))
            .respond_with(xml(
                200,
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<ListTagsForResourceResponse xmlns="{ROUTE53_XMLNS}"><ResourceTagSet><ResourceType>hostedzone</ResourceType><ResourceId>Z123</ResourceId><Tags><Tag><Key>{DNSZONE_OWNER_TAG}</Key><Value>dns-system/example</Value></Tag></Tags></ResourceTagSet></ListTagsForResourceResponse>"#
                ),
            ))
            .mount(&server)
            .await;
        let client = sdk_client(&server.uri());

        let tags = client
            .list_tags_for_hosted_zone("/hostedzone/Z123")
            .await
            .unwrap();

        assert_eq!(tags, vec![Tag::new(DNSZONE_OWNER_TAG, "dns-system/example")]);
        assert_eq!(
            request_paths(&server).await,
            vec!["/2013-04-01/tags/hostedzone/Z123".to_string()]
        );
    }

    #[tokio::test]
    async fn test_change_tags_strips_hosted_zone_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2013-04-01/tags/hostedzone/Z123"))
            .respond_with(xml(
                200,
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<ChangeTagsForResourceResponse xmlns="{ROUTE53_XMLNS}"/>"#
                ),
            ))
            .mount(&server)
            .await;
        let client = sdk_client(&server.uri());

        client
            .change_tags_for_hosted_zone(
                "/hostedzone/Z123",
                vec![Tag::new("env", "prod")],
                vec!["stale".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(
            request_paths(&server).await,
            vec!["/2013-04-01/tags/hostedzone/Z123".to_string()]
        );
    }

    #[tokio::test]
    async fn test_get_hosted_zone_keeps_prefixed_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2013-04-01/hostedzone/Z123"))
            .respond_with(xml(
                200,
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<GetHostedZoneResponse xmlns="{ROUTE53_XMLNS}"><HostedZone><Id>/hostedzone/Z123</Id><Name>example.com.</Name><CallerReference>ref-1</CallerReference><Config><PrivateZone>false</PrivateZone></Config><ResourceRecordSetCount>2</ResourceRecordSetCount></HostedZone></GetHostedZoneResponse>"#
                ),
            ))
            .mount(&server)
            .await;
        let client = sdk_client(&server.uri());

        let zone = client.get_hosted_zone("/hostedzone/Z123").await.unwrap();

        assert_eq!(zone.id, "/hostedzone/Z123");
        assert_eq!(zone.name, "example.com.");
        assert_eq!(zone.caller_reference, "ref-1");
    }

    #[tokio::test]
    async fn test_service_error_keeps_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2013-04-01/hostedzone/ZGONE"))
            .respond_with(xml(
                404,
                route53_error("NoSuchHostedZone", "No hosted zone found with ID: ZGONE"),
            ))
            .mount(&server)
            .await;
        let client = sdk_client(&server.uri());

        let err = client.get_hosted_zone("/hostedzone/ZGONE").await.unwrap_err();

        assert!(err.is_not_found(), "{err:?}");
        assert_eq!(err.message(), Some("No hosted zone found with ID: ZGONE"));
        assert!(matches!(
            err,
            ProviderError::Service { ref operation, .. } if operation == "GetHostedZone"
        ));
    }

    #[tokio::test]
    async fn test_access_denied_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/2013-04-01/hostedzone/Z123"))
            .respond_with(xml(
                403,
                route53_error("AccessDenied", "User is not authorized to perform this action"),
            ))
            .mount(&server)
            .await;
        let client = sdk_client(&server.uri());

        let err = client
            .delete_hosted_zone("/hostedzone/Z123")
            .await
            .unwrap_err();

        assert!(err.is_access_denied(), "{err:?}");
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_transport() {
        // Bind and release a port so nothing is listening on it
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = sdk_client(&format!("http://127.0.0.1:{port}"));

        let err = client.get_hosted_zone("/hostedzone/Z123").await.unwrap_err();

        assert!(
            matches!(err, ProviderError::Transport { ref operation, .. } if operation == "GetHostedZone"),
            "{err:?}"
        );
        assert_eq!(err.code(), None);
    }

    #[tokio::test]
    async fn test_empty_pagination_token_ends_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", GET_RESOURCES_TARGET))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        r#"{"PaginationToken":"","ResourceTagMappingList":[{"ResourceARN":"arn:aws:route53:::hostedzone/Z123","Tags":[]}]}"#,
                        "application/x-amz-json-1.1",
                    ),
            )
            .mount(&server)
            .await;
        let client = sdk_client(&server.uri());

        let page = client
            .get_resources_by_tag(
                HOSTED_ZONE_RESOURCE_TYPE_FILTER,
                DNSZONE_OWNER_TAG,
                "dns-system/example",
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            page.resource_arns,
            vec!["arn:aws:route53:::hostedzone/Z123".to_string()]
        );
        assert_eq!(page.pagination_token, None);
    }

    #[tokio::test]
    async fn test_pagination_token_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", GET_RESOURCES_TARGET))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"PaginationToken":"page-2","ResourceTagMappingList":[]}"#,
                "application/x-amz-json-1.1",
            ))
            .mount(&server)
            .await;
        let client = sdk_client(&server.uri());

        let page = client
            .get_resources_by_tag(
                HOSTED_ZONE_RESOURCE_TYPE_FILTER,
                DNSZONE_OWNER_TAG,
                "dns-system/example",
                None,
            )
            .await
            .unwrap();

        assert!(page.resource_arns.is_empty());
        assert_eq!(page.pagination_token.as_deref(), Some("page-2"));
    }
}
