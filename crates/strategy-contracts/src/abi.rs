use alloy::sol;

sol! {
    /// Events emitted by the vault.
    #[derive(Debug, PartialEq, Eq)]
    interface IVault {
        event Approval(address indexed owner, address indexed spender, uint256 value);
        event Deposit(address indexed sender, address indexed owner, uint256 assets, uint256 shares);
        event Reported(uint256 profit, uint256 loss, uint256 managementFees, uint256 performanceFees);
        event RoleAdminChanged(bytes32 indexed role, bytes32 indexed previousAdminRole, bytes32 indexed newAdminRole);
        event RoleGranted(bytes32 indexed role, address indexed account, address indexed sender);
        event RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender);
        event StrategyAdded(address indexed strategy);
        event StrategyMigrated(address indexed oldVersion, address indexed newVersion);
        event StrategyRemoved(address indexed strategy, uint256 totalAssets);
        event Transfer(address indexed from, address indexed to, uint256 value);
        event UpdateManagementFee(uint256 fee);
        event UpdateManagementRecipient(address indexed recipient);
        event UpdatePerformanceFee(address indexed strategy, uint256 newFee);
        event UpdateStrategyInfo(address indexed strategy, uint256 newBalance);
        event UpdateStrategySharePercent(address indexed strategy, uint256 newPercent);
        event UpdateWithdrawalQueue(address[] queue);
        event Withdraw(address indexed sender, address indexed receiver, address indexed owner, uint256 assets, uint256 shares);
    }
}

sol! {
    /// Base strategy: the keeper entrypoints, the reads used to enrich the
    /// indexed data and the events it emits.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IBaseStrategy {
        function isPaused() external view returns (bool);
        function name() external view returns (string memory);
        function lastTotalAssets() external view returns (uint256);
        function rebalanceAndReport() external returns (uint256, uint256, uint256);

        event EmergencyWithdraw(uint256 timestamp, uint256 amount);
        event Pull(uint256 assetPull);
        event Push(uint256 assetPush);
        event Report(uint256 time, uint256 profit, uint256 loss);
        event RoleAdminChanged(bytes32 indexed role, bytes32 indexed previousAdminRole, bytes32 indexed newAdminRole);
        event RoleGranted(bytes32 indexed role, address indexed account, address indexed sender);
        event RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender);
        event StrategyPaused(uint256 timestamp);
        event StrategyUnpaused(uint256 timestamp);
    }
}
